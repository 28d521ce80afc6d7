// Copyright 2025 the Parley Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

use core::cell::{Cell, RefCell};
use core::time::Duration;
use std::rc::Rc;

use crate::field::{FieldKind, FieldResolver};
use crate::layout::Clock;
use crate::{EditEngine, EditPaM, EditSelection, EngineConfig, EngineServices, Notification};

/// An engine with a recording notification handler.
pub(crate) struct TestEnv {
    pub(crate) engine: EditEngine,
    notifications: Rc<RefCell<Vec<Notification>>>,
}

impl TestEnv {
    pub(crate) fn new() -> Self {
        Self::with_config(EngineConfig::default())
    }

    pub(crate) fn with_config(config: EngineConfig) -> Self {
        Self::with_services(config, EngineServices::default())
    }

    pub(crate) fn with_services(config: EngineConfig, services: EngineServices) -> Self {
        let mut engine = EditEngine::with_services(config, services);
        let notifications = Rc::new(RefCell::new(Vec::new()));
        let sink = notifications.clone();
        engine.set_notification_handler(move |n| sink.borrow_mut().push(n.clone()));
        Self {
            engine,
            notifications,
        }
    }

    /// An engine holding `text`, with empty history and notification log.
    pub(crate) fn with_text(config: EngineConfig, text: &str) -> Self {
        let mut env = Self::with_config(config);
        env.engine.set_text(text);
        env.take_notifications();
        env
    }

    pub(crate) fn texts(&self) -> Vec<String> {
        self.engine
            .doc()
            .paragraphs()
            .map(|n| n.text().to_owned())
            .collect()
    }

    pub(crate) fn pam(&self, para: usize, offset: usize) -> EditPaM {
        self.engine.doc().pam(para, offset)
    }

    pub(crate) fn sel(&self, anchor: (usize, usize), focus: (usize, usize)) -> EditSelection {
        EditSelection::new(self.pam(anchor.0, anchor.1), self.pam(focus.0, focus.1))
    }

    /// Resolves `pam` to `(paragraph, offset)`, failing on stale handles.
    pub(crate) fn at(&self, pam: EditPaM) -> (usize, usize) {
        self.engine.doc().resolve(pam).expect("live position")
    }

    pub(crate) fn take_notifications(&self) -> Vec<Notification> {
        core::mem::take(&mut *self.notifications.borrow_mut())
    }

    /// Checks the structural invariants every edit has to keep.
    #[track_caller]
    pub(crate) fn assert_invariants(&mut self) {
        let doc = self.engine.doc().clone();
        assert!(doc.len() >= 1, "document without paragraphs");
        for (para, node) in doc.paragraphs().enumerate() {
            for attr in node.char_attribs().iter() {
                assert!(
                    attr.start() <= attr.end() && attr.end() <= node.len(),
                    "attribute {:?} outside paragraph {para} of length {}",
                    attr.range(),
                    node.len()
                );
            }
            let portion = self.engine.paragraph_portion(para).expect("portion");
            let mut expected = 0;
            for line in portion.lines() {
                assert_eq!(line.start(), expected, "gap in lines of paragraph {para}");
                expected = line.end();
            }
            assert_eq!(expected, node.len(), "lines of paragraph {para} stop early");
        }
        let mut positions: Vec<EditPaM> = self
            .engine
            .views
            .values()
            .flat_map(|view| [view.selection().anchor(), view.selection().focus()])
            .collect();
        if let Some(ime) = &self.engine.ime {
            positions.extend(ime.ends());
        }
        for pam in positions {
            if let Err(err) = doc.check_position(pam) {
                panic!("stored position {pam:?} is not live: {err}");
            }
        }
    }
}

/// A clock that advances by `step` every time it is read.
pub(crate) struct StepClock {
    now: Cell<Duration>,
    step: Duration,
}

impl StepClock {
    pub(crate) fn new(step: Duration) -> Self {
        Self {
            now: Cell::new(Duration::ZERO),
            step,
        }
    }
}

impl Clock for StepClock {
    fn now(&self) -> Duration {
        let now = self.now.get();
        self.now.set(now + self.step);
        now
    }
}

/// Expands every variable to a shared value and counts calls.
#[derive(Clone, Default)]
pub(crate) struct VariableResolver {
    pub(crate) value: Rc<RefCell<String>>,
    pub(crate) calls: Rc<Cell<usize>>,
}

impl FieldResolver for VariableResolver {
    fn expand(&self, field: &FieldKind, _para: usize, _offset: usize) -> String {
        self.calls.set(self.calls.get() + 1);
        match field {
            FieldKind::Variable(_) => self.value.borrow().clone(),
            _ => String::new(),
        }
    }
}
