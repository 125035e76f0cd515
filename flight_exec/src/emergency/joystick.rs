//! Game controller emergency, triggered by holding A and RB together

use comms_if::input::JoyButtons;

use super::{trigger, EmergencyBroadcaster, EmergencyNotifier, InputHandler};

/// Index of the A button.
pub const BUTTON_A: usize = 0;

/// Index of the right bumper.
pub const BUTTON_RB: usize = 5;

pub struct GameControllerEmergency {
    broadcaster: EmergencyBroadcaster,
}

impl GameControllerEmergency {
    pub fn new(broadcaster: EmergencyBroadcaster) -> Self {
        Self { broadcaster }
    }
}

impl EmergencyNotifier for GameControllerEmergency {
    fn broadcaster(&self) -> &EmergencyBroadcaster {
        &self.broadcaster
    }
}

impl InputHandler<JoyButtons> for GameControllerEmergency {
    fn handle(&self, buttons: &JoyButtons) {
        if buttons.is_pressed(BUTTON_A) && buttons.is_pressed(BUTTON_RB) {
            trigger("Game controller", &self.broadcaster);
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::emergency::test::{emergency_task, OnceSubmitter};
    use std::sync::{atomic::Ordering, Arc};

    #[test]
    fn test_button_combination() {
        let notifier = GameControllerEmergency::new(EmergencyBroadcaster::new(emergency_task()));
        let submitter = Arc::new(OnceSubmitter::default());
        notifier.register_task_executor(submitter.clone()).unwrap();

        for buttons in &[
            vec![],
            vec![1],
            vec![1, 0, 0, 0, 0, 0],
            vec![0, 0, 0, 0, 0, 1],
            vec![1, 1, 1, 1, 1, 0, 1],
            vec![2, 0, 0, 0, 0, 1],
        ] {
            notifier.handle(&JoyButtons(buttons.clone()));
        }
        assert_eq!(submitter.submissions.load(Ordering::SeqCst), 0);

        notifier.handle(&JoyButtons::from(vec![1, 0, 0, 0, 0, 1, 0, 0]));
        assert_eq!(submitter.submissions.load(Ordering::SeqCst), 1);
    }
}
