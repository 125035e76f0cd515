//! # Flight Control Benchmark

use criterion::{criterion_group, criterion_main, Criterion};

use flight_lib::{
    geom::{InertialFrameVelocity, Pose},
    traj::{Choreography, Circle4d, Hold4d, StraightLine4d, Trajectory4d, YawMode},
    traj_ctrl::{FlightCtrlParams, PidController4d},
};

fn build_choreography() -> Choreography {
    let start = Pose::new(0.0, 0.0, 1.0, 0.0);
    let corner = Pose::new(1.0, 1.0, 1.5, std::f64::consts::FRAC_PI_2);

    Choreography::builder()
        .with_trajectory(Hold4d::new(start))
        .for_time(2.0)
        .with_finite(StraightLine4d::new(start, corner, 0.5).unwrap())
        .with_trajectory(
            Circle4d::new(corner, 0.5, 0.2, 0.0)
                .unwrap()
                .with_plane_angle(0.3)
                .unwrap()
                .with_yaw(YawMode::Rotating)
                .unwrap(),
        )
        .for_time(20.0)
        .build()
        .unwrap()
}

fn flight_ctrl_benchmark(c: &mut Criterion) {
    // ---- Sampling ----

    let mut choreo = build_choreography();
    let mut time_s = 0.0;
    c.bench_function("Choreography::state", |b| {
        b.iter(|| {
            time_s += 0.01;
            choreo.state(time_s)
        })
    });

    // ---- Control ----

    let params = FlightCtrlParams::default();
    let mut ctrl = PidController4d::from_params(&params).unwrap();
    let mut choreo = build_choreography();
    let pose = Pose::new(0.1, -0.1, 0.9, 0.2);
    let velocity = InertialFrameVelocity::new(0.1, 0.0, 0.0, 0.0);
    let mut time_s = 0.0;

    c.bench_function("PidController4d::compute_body", |b| {
        b.iter(|| {
            time_s += params.control_period_s;
            ctrl.compute_body(&mut choreo, time_s, &pose, &velocity)
        })
    });
}

criterion_group!(benches, flight_ctrl_benchmark);
criterion_main!(benches);
