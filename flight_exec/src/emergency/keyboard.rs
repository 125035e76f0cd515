//! Keyboard emergency, triggered by pressing `x`

use comms_if::input::{KeyAction, KeyEvent};

use super::{trigger, EmergencyBroadcaster, EmergencyNotifier, InputHandler};

/// Key which triggers the emergency.
pub const EMERGENCY_KEY: char = 'x';

pub struct KeyboardEmergency {
    broadcaster: EmergencyBroadcaster,
}

impl KeyboardEmergency {
    pub fn new(broadcaster: EmergencyBroadcaster) -> Self {
        Self { broadcaster }
    }
}

impl EmergencyNotifier for KeyboardEmergency {
    fn broadcaster(&self) -> &EmergencyBroadcaster {
        &self.broadcaster
    }
}

impl InputHandler<KeyEvent> for KeyboardEmergency {
    fn handle(&self, event: &KeyEvent) {
        if event.key == EMERGENCY_KEY && event.action == KeyAction::Pressed {
            trigger("Keyboard", &self.broadcaster);
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::{
        emergency::test::{emergency_task, OnceSubmitter},
        task_exec::TaskSubmitter,
    };
    use std::sync::{atomic::Ordering, Arc};

    #[test]
    fn test_only_x_press_triggers() {
        let notifier = KeyboardEmergency::new(EmergencyBroadcaster::new(emergency_task()));
        let submitter = Arc::new(OnceSubmitter::default());
        let submitter_dyn: Arc<dyn TaskSubmitter> = submitter.clone();
        notifier.register_task_executor(submitter_dyn.clone()).unwrap();

        notifier.handle(&KeyEvent::pressed('a'));
        notifier.handle(&KeyEvent::released('x'));
        assert_eq!(submitter.submissions.load(Ordering::SeqCst), 0);

        notifier.handle(&KeyEvent::pressed('x'));
        assert_eq!(submitter.submissions.load(Ordering::SeqCst), 1);

        assert!(notifier.remove_task_executor(&submitter_dyn).unwrap());
        notifier.handle(&KeyEvent::pressed('x'));
        assert_eq!(submitter.submissions.load(Ordering::SeqCst), 1);
    }
}
