use serde_json::json;
use threads_core::{ConfigError, ErrorExt, ErrorReporter, ThreadsError};

#[test]
fn test_error_codes() {
    let remote = ThreadsError::RemoteCallFailed {
        status: 400,
        body: json!({"error": {"message": "Invalid parameter"}}),
    };
    assert_eq!(remote.error_code(), "REMOTE_CALL_FAILED");

    let invalid = ThreadsError::InvalidResponse {
        details: "missing id".to_string(),
    };
    assert_eq!(invalid.error_code(), "INVALID_RESPONSE");

    let config_error = ThreadsError::Config(ConfigError::MissingField {
        field: "app_secret".to_string(),
    });
    assert_eq!(config_error.error_code(), "CONFIG");

    let unreadable = ConfigError::Io {
        path: "/etc/threads.toml".to_string(),
        source: std::io::Error::from(std::io::ErrorKind::PermissionDenied),
    };
    assert_eq!(unreadable.error_code(), "CONFIG_IO");
    assert!(unreadable.user_friendly_message().contains("/etc/threads.toml"));
    assert!(std::error::Error::source(&unreadable).is_some());
}

#[test]
fn test_retryable_errors() {
    let throttled = ThreadsError::RemoteCallFailed {
        status: 429,
        body: json!({}),
    };
    assert!(throttled.is_retryable());

    let server = ThreadsError::RemoteCallFailed {
        status: 503,
        body: json!({}),
    };
    assert!(server.is_retryable());

    let bad_request = ThreadsError::RemoteCallFailed {
        status: 400,
        body: json!({}),
    };
    assert!(!bad_request.is_retryable());

    let config_error = ThreadsError::Config(ConfigError::MissingEnvironmentVariable {
        var_name: "USER_ID".to_string(),
    });
    assert!(!config_error.is_retryable());
}

#[test]
fn test_remote_body_is_preserved() {
    let body = json!({"error": {"message": "Unsupported get request", "code": 100}});
    let error = ThreadsError::RemoteCallFailed {
        status: 400,
        body: body.clone(),
    };
    assert_eq!(error.remote_body(), Some(&body));
    assert_eq!(error.status_code(), Some(400));
}

#[test]
fn test_user_friendly_messages() {
    let remote = ThreadsError::RemoteCallFailed {
        status: 400,
        body: json!({"error": {"message": "Invalid OAuth access token"}}),
    };
    let message = remote.user_friendly_message();
    assert!(message.contains("Invalid OAuth access token"));

    let opaque = ThreadsError::RemoteCallFailed {
        status: 502,
        body: json!("Bad Gateway"),
    };
    assert!(opaque.user_friendly_message().contains("502"));

    let config_error = ThreadsError::Config(ConfigError::MissingEnvironmentVariable {
        var_name: "ACCESS_TOKEN".to_string(),
    });
    assert!(config_error.user_friendly_message().contains("ACCESS_TOKEN"));
}

#[test]
fn test_error_reporter() {
    let reporter = ErrorReporter::new()
        .with_error_reporting(true)
        .with_warning_reporting(true);
    let error = ThreadsError::RemoteCallFailed {
        status: 500,
        body: json!({"error": {"message": "boom"}}),
    };

    // Only checks that reporting does not panic
    reporter.report_error(&error);
    reporter.report_warning(&error);
}
