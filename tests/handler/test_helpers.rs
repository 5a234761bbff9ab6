//! Shared fixtures and helpers for sync handler BDD scenarios.

use std::cell::RefCell;
use std::rc::Rc;
use std::time::Duration;

use rstest::fixture;
use tether::test_support::{RecordingTarget, WriteLog};
use tether::{HandlerConfig, ManualScheduler, SyncHandler};

pub type ScenarioHandler = SyncHandler<u64, RecordingTarget, u64, ManualScheduler>;

/// State shared by the steps of one scenario.
#[derive(Clone, Debug, Default)]
pub struct HandlerWorld {
    pub scheduler: ManualScheduler,
    pub log: WriteLog,
    pub handler: Rc<RefCell<Option<ScenarioHandler>>>,
    pub targets: Rc<RefCell<Vec<RecordingTarget>>>,
}

impl HandlerWorld {
    pub fn install_handler(&self, duration: Duration) {
        let handler = SyncHandler::new(
            HandlerConfig::new()
                .getter(|source: &u64| *source)
                .setter(|target: &RecordingTarget, value: &u64| target.write(*value))
                .duration(duration),
            self.scheduler.clone(),
        );
        *self.handler.borrow_mut() = Some(handler);
    }

    pub fn with_handler<R>(&self, action: impl FnOnce(&ScenarioHandler) -> R) -> R {
        let slot = self.handler.borrow();
        let Some(handler) = slot.as_ref() else {
            panic!("test setup requires a configured handler");
        };
        action(handler)
    }

    pub fn target(&self, name: &str) -> RecordingTarget {
        self.targets
            .borrow()
            .iter()
            .find(|target| target.name() == name)
            .cloned()
            .unwrap_or_else(|| panic!("no target named {name}"))
    }
}

#[fixture]
pub fn handler_world() -> HandlerWorld {
    HandlerWorld::default()
}
