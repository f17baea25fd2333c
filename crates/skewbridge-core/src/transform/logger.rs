use std::sync::Mutex;

use skewbridge_core_types::schema::EVENT_TRANSFORM_WARNINGS;

use crate::model::PathAddress;

/// Per-host queue of transformation warnings
///
/// Warnings raised while transforming for one target host are queued and
/// emitted as a single combined `warn` event by [`TransformersLogger::flush`],
/// so a schema gap shared by many resources produces one log entry per pass.
#[derive(Debug)]
pub struct TransformersLogger {
    host: String,
    messages: Mutex<Vec<String>>,
}

impl TransformersLogger {
    pub fn new(host: impl Into<String>) -> Self {
        Self {
            host: host.into(),
            messages: Mutex::new(Vec::new()),
        }
    }

    pub fn host(&self) -> &str {
        &self.host
    }

    /// Queue a warning; a message already pending is not queued twice
    pub fn log_warning(&self, message: impl Into<String>) {
        let message = message.into();
        self.messages
            .lock()
            .map(|mut m| {
                if !m.contains(&message) {
                    m.push(message);
                }
            })
            .ok();
    }

    /// Queue a warning about attributes of a resource or an operation
    ///
    /// `model` describes the target model, e.g. `core model version '1.4.0'`.
    pub fn log_attribute_warning(
        &self,
        address: &PathAddress,
        operation: Option<&str>,
        model: &str,
        message: &str,
        attributes: &[String],
    ) {
        self.log_warning(attribute_warning_message(
            address, operation, model, message, attributes,
        ));
    }

    /// Queued messages, oldest first
    pub fn pending(&self) -> Vec<String> {
        self.messages.lock().map(|m| m.clone()).unwrap_or_default()
    }

    /// Emit every queued warning as one event and clear the queue
    ///
    /// Returns the combined message, or `None` when nothing was queued.
    pub fn flush(&self) -> Option<String> {
        let drained: Vec<String> = self
            .messages
            .lock()
            .map(|mut m| m.drain(..).collect())
            .unwrap_or_default();
        if drained.is_empty() {
            return None;
        }

        let combined = format!(
            "There were problems during the transformation process for target host: '{}' \nProblems found: \n{}",
            self.host,
            drained.join("\n")
        );
        tracing::warn!(
            component = module_path!(),
            event = EVENT_TRANSFORM_WARNINGS,
            host = %self.host,
            problem_count = drained.len() as u64,
            "{}",
            combined
        );
        Some(combined)
    }
}

/// Text of an attribute problem at a resource or operation
pub fn attribute_warning_message(
    address: &PathAddress,
    operation: Option<&str>,
    model: &str,
    message: &str,
    attributes: &[String],
) -> String {
    let attributes = if attributes.is_empty() {
        String::new()
    } else {
        format!("[{}]", attributes.join(", "))
    };
    let text = match operation {
        Some(op) => format!(
            "Transforming operation {} at resource {} to {} -- {} {}",
            op, address, model, message, attributes
        ),
        None => format!(
            "Transforming resource {} to {} -- {} {}",
            address, model, message, attributes
        ),
    };
    text.trim_end().to_string()
}
