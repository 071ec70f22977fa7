use glam::Vec2;

/// Discrete player actions delivered as edges.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PlayerAction {
    Kick,
    Reload,
}

/// Handle returned by the `subscribe_*` calls; pass it back to unsubscribe.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Subscription(u64);

enum Handler {
    Button(PlayerAction, Box<dyn FnMut()>),
    Direction(Box<dyn FnMut(Vec2)>),
}

/// Single-threaded input event bus.
///
/// Holds the current direction signal and the handlers subscribed to it and to the
/// button actions. Components subscribe when activated and unsubscribe when
/// deactivated, so no handler outlives its owner's activation.
#[derive(Default)]
pub struct InputBus {
    direction: Vec2,
    handlers: Vec<(Subscription, Handler)>,
    next_id: u64,
}

impl InputBus {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn direction(&self) -> Vec2 {
        self.direction
    }

    pub fn subscribe_button(
        &mut self,
        action: PlayerAction,
        handler: impl FnMut() + 'static,
    ) -> Subscription {
        self.push(Handler::Button(action, Box::new(handler)))
    }

    /// Handler runs whenever the direction signal changes value.
    pub fn subscribe_direction(&mut self, handler: impl FnMut(Vec2) + 'static) -> Subscription {
        self.push(Handler::Direction(Box::new(handler)))
    }

    pub fn unsubscribe(&mut self, subscription: Subscription) -> bool {
        let before = self.handlers.len();
        self.handlers.retain(|(s, _)| *s != subscription);
        self.handlers.len() != before
    }

    /// Drops every handler, e.g. on level reload.
    pub fn clear(&mut self) {
        self.handlers.clear();
    }

    pub fn subscriber_count(&self) -> usize {
        self.handlers.len()
    }

    /// Delivers one press of `action`.
    pub fn emit(&mut self, action: PlayerAction) {
        for (_, handler) in &mut self.handlers {
            if let Handler::Button(a, f) = handler {
                if *a == action {
                    f();
                }
            }
        }
    }

    pub fn set_direction(&mut self, direction: Vec2) {
        if direction == self.direction {
            return;
        }
        self.direction = direction;
        for (_, handler) in &mut self.handlers {
            if let Handler::Direction(f) = handler {
                f(direction);
            }
        }
    }

    fn push(&mut self, handler: Handler) -> Subscription {
        let sub = Subscription(self.next_id);
        self.next_id += 1;
        self.handlers.push((sub, handler));
        sub
    }
}
