use termtracker::config::parse_port;
use termtracker::error::AppError;

#[test]
fn unset_port_uses_the_default() {
    assert_eq!(parse_port(None).expect("Failed to parse port"), 5000);
    assert_eq!(parse_port(Some("8080")).expect("Failed to parse port"), 8080);
}

#[test]
fn malformed_port_is_a_config_error() {
    let err = parse_port(Some("not-a-port")).expect_err("Port should be rejected");

    assert!(matches!(err, AppError::InvalidConfig { key: "PORT", .. }));
    assert_eq!(err.to_string(), "PORT is not valid: not-a-port");
}
