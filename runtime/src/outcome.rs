//! Uniform success and failure reporting shared by all runners.

use crate::notifier::Notifier;
use crate::options::{ActionOptions, ErrorFlow, SuccessFlow};
use activity_console_core::ApiError;

/// Report a finished run and turn it into the runner's return value.
pub(crate) fn report<T>(
    result: Result<T, ApiError>,
    options: &ActionOptions<T>,
    notifier: &dyn Notifier,
) -> Option<T> {
    match result {
        Ok(value) => {
            metrics::counter!("action.completed").increment(1);
            let flow = options
                .on_success
                .as_ref()
                .map_or(SuccessFlow::Notify, |callback| callback(&value));
            if let (SuccessFlow::Notify, Some(message)) = (flow, &options.success_message) {
                notifier.success(&message.render(&value));
            }
            Some(value)
        }
        Err(error) => {
            metrics::counter!("action.failed", "kind" => error.kind().as_str()).increment(1);
            report_error(&error, options, notifier);
            None
        }
    }
}

fn report_error<T>(error: &ApiError, options: &ActionOptions<T>, notifier: &dyn Notifier) {
    let flow = options
        .on_error
        .as_ref()
        .map_or(ErrorFlow::Unhandled, |callback| callback(error));
    if flow == ErrorFlow::Handled {
        tracing::debug!(kind = %error.kind(), "Action error handled by caller");
        return;
    }

    if error.is_unauthorized() && options.silent_unauthorized {
        tracing::debug!("Unauthorized action failure left to the unauthorized handler");
        return;
    }

    let message = error
        .message()
        .map(str::to_string)
        .or_else(|| options.error_message.as_ref().map(|m| m.render(error)))
        .unwrap_or_else(|| error.kind().default_message().to_string());
    notifier.error(&message);
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use std::sync::{Mutex, PoisonError};

    /// Notifier double that records `(level, message)` pairs.
    #[derive(Debug, Default)]
    pub(crate) struct Recorder(Mutex<Vec<(&'static str, String)>>);

    impl Recorder {
        pub(crate) fn messages(&self) -> Vec<(&'static str, String)> {
            self.0.lock().unwrap_or_else(PoisonError::into_inner).clone()
        }

        fn push(&self, level: &'static str, message: &str) {
            self.0
                .lock()
                .unwrap_or_else(PoisonError::into_inner)
                .push((level, message.to_string()));
        }
    }

    impl Notifier for Recorder {
        fn success(&self, message: &str) {
            self.push("success", message);
        }

        fn error(&self, message: &str) {
            self.push("error", message);
        }

        fn warning(&self, message: &str) {
            self.push("warning", message);
        }
    }

    fn run(result: Result<u32, ApiError>, options: &ActionOptions<u32>) -> Vec<(&'static str, String)> {
        let recorder = Recorder::default();
        report(result, options, &recorder);
        recorder.messages()
    }

    #[test]
    fn test_success_message() {
        let options = ActionOptions::new().success_message("保存成功");
        assert_eq!(run(Ok(1), &options), vec![("success", "保存成功".to_string())]);
        assert!(run(Ok(1), &ActionOptions::new()).is_empty());
    }

    #[test]
    fn test_on_success_can_veto_notification() {
        let options = ActionOptions::new()
            .success_message("保存成功")
            .on_success(|n: &u32| if *n > 1 { SuccessFlow::Silent } else { SuccessFlow::Notify });
        assert_eq!(run(Ok(2), &options), vec![]);
        assert_eq!(run(Ok(1), &options).len(), 1);
    }

    #[test]
    fn test_error_message_precedence() {
        let options = ActionOptions::new().error_message("操作失败");

        let backend = ApiError::business(200, 4001, "名额已满".to_string());
        assert_eq!(run(Err(backend), &options), vec![("error", "名额已满".to_string())]);

        assert_eq!(
            run(Err(ApiError::network()), &options),
            vec![("error", "操作失败".to_string())]
        );

        assert_eq!(
            run(Err(ApiError::timeout()), &ActionOptions::new()),
            vec![("error", ApiError::timeout().kind().default_message().to_string())]
        );
    }

    #[test]
    fn test_rendered_error_message() {
        let options = ActionOptions::new().error_message_with(|e: &ApiError| format!("失败: {}", e.kind()));
        assert_eq!(
            run(Err(ApiError::network()), &options),
            vec![("error", "失败: NETWORK".to_string())]
        );
    }

    #[test]
    fn test_unauthorized_is_silent_by_default() {
        let error = ApiError::soft_unauthorized(200, 401, "token expired".to_string());
        assert!(run(Err(error.clone()), &ActionOptions::new()).is_empty());

        let loud = ActionOptions::new().silent_unauthorized(false);
        assert_eq!(run(Err(error), &loud), vec![("error", "token expired".to_string())]);
    }

    #[test]
    fn test_handled_error_is_not_reported() {
        let options = ActionOptions::new().on_error(|_| ErrorFlow::Handled);
        assert!(run(Err(ApiError::network()), &options).is_empty());
    }
}
