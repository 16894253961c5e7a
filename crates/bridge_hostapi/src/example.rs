//! Example capability
//!
//! Reference implementation of a bridged capability: a couple of plain
//! methods plus a status field whose changes go out as a signal.

use serde_json::{Value, json};
use tracing::debug;

use bridge_runtime::{CapabilityError, CapabilityObject, SignalEmitter};

/// The built-in `example` capability.
#[derive(Default)]
pub struct ExampleApi {
    status: String,
    signals: Option<SignalEmitter>,
}

impl ExampleApi {
    pub fn status(&self) -> &str {
        &self.status
    }

    fn set_status(&mut self, status: String) {
        if self.status == status {
            return;
        }
        debug!(status = %status, "example status changed");
        self.status = status;
        if let Some(signals) = &self.signals {
            signals.emit("statusChanged", vec![json!(self.status)]);
        }
    }

    fn string_arg(method: &str, args: &[Value], index: usize) -> Result<String, CapabilityError> {
        args.get(index)
            .and_then(Value::as_str)
            .map(str::to_string)
            .ok_or_else(|| CapabilityError::InvalidArguments {
                method: method.to_string(),
                reason: format!("argument {} must be a string", index),
            })
    }

    fn number_arg(method: &str, args: &[Value], index: usize) -> Result<i64, CapabilityError> {
        args.get(index)
            .and_then(Value::as_i64)
            .ok_or_else(|| CapabilityError::InvalidArguments {
                method: method.to_string(),
                reason: format!("argument {} must be an integer", index),
            })
    }
}

impl CapabilityObject for ExampleApi {
    fn attach(&mut self, signals: SignalEmitter) {
        self.signals = Some(signals);
    }

    fn invoke(&mut self, method: &str, args: &[Value]) -> Result<Value, CapabilityError> {
        match method {
            "echo" => Ok(json!(Self::string_arg(method, args, 0)?)),
            "add" => {
                let a = Self::number_arg(method, args, 0)?;
                let b = Self::number_arg(method, args, 1)?;
                Ok(json!(a + b))
            }
            "setStatus" => {
                let status = Self::string_arg(method, args, 0)?;
                self.set_status(status);
                Ok(Value::Null)
            }
            other => Err(CapabilityError::UnknownMethod(other.to_string())),
        }
    }
}
