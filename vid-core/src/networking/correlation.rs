use std::sync::Mutex;

use uuid::Uuid;

/// Header sent with every request so a whole flow can be traced server side.
pub trait CorrelationHeader: Send + Sync {
    fn name(&self) -> &str;

    fn value(&self) -> String;

    /// Start a new correlation, called once per `create_request`.
    fn reset(&self);
}

/// Default correlation header: `request-id` carrying a random UUID.
pub struct RequestCorrelationHeader {
    value: Mutex<String>,
}

impl RequestCorrelationHeader {
    pub const NAME: &'static str = "request-id";

    pub fn new() -> Self {
        Self {
            value: Mutex::new(Uuid::new_v4().to_string()),
        }
    }
}

impl Default for RequestCorrelationHeader {
    fn default() -> Self {
        Self::new()
    }
}

impl CorrelationHeader for RequestCorrelationHeader {
    fn name(&self) -> &str {
        Self::NAME
    }

    fn value(&self) -> String {
        self.value
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .clone()
    }

    fn reset(&self) {
        let mut value = self
            .value
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        *value = Uuid::new_v4().to_string();
    }
}
