//! Human-readable error descriptions and structured JSON error formatting.

/// Map an eyre::Report to a human-readable explanation with likely causes and fix hints.
pub fn humanize(err: &eyre::Report) -> String {
    use plate_core::PlateError;

    // Typed matches first
    if let Some(pe) = err.downcast_ref::<PlateError>() {
        return match pe {
            PlateError::Config(msg) => format!(
                "What happened: Invalid configuration ({msg}).\nLikely causes: Missing or out-of-range values in the TOML, or a channel map that conflicts with the layout.\nHow to fix: Edit the config file, then rerun. See README for a sample."
            ),
            PlateError::Device(msg) => format!(
                "What happened: The DAQ session failed ({msg}).\nLikely causes: Server unreachable, session closed by peer, or network fault mid-stream.\nHow to fix: Check the [daq] server address and that the capture server is streaming, then rerun."
            ),
            PlateError::Timeout => "What happened: The device produced no data within the configured timeout.\nLikely causes: Server paused, or daq.poll_timeout_ms set too low.\nHow to fix: Raise daq.poll_timeout_ms in the config or check the server.".to_string(),
            PlateError::Decode(msg) => format!(
                "What happened: A sample batch could not be decoded ({msg}).\nLikely causes: Channel metadata mismatch or a truncated payload.\nHow to fix: Verify the advertised channel ids match [surfaces] in the config."
            ),
            PlateError::State(msg) => format!(
                "What happened: Internal stream state error ({msg}).\nLikely causes: See logs.\nHow to fix: Re-run with --log-level=debug for more detail."
            ),
        };
    }

    // Generic fallback for errors from init paths that carry no PlateError
    let msg = err.to_string();
    let mut cause = String::new();
    if let Some(src) = err.source() {
        cause = format!(" Cause: {src}");
    }
    format!(
        "Something went wrong.{cause}\nHow to fix: Re-run with --log-level=debug for details. Original: {msg}"
    )
}

/// Map PlateError variants (if present) to stable exit codes; other errors return 1.
pub fn exit_code_for_error(err: &eyre::Report) -> i32 {
    use plate_core::PlateError;
    if let Some(pe) = err.downcast_ref::<PlateError>() {
        return match pe {
            PlateError::Config(_) => 2,
            PlateError::Device(_) => 3,
            PlateError::Timeout => 4,
            PlateError::Decode(_) => 5,
            PlateError::State(_) => 6,
        };
    }
    1
}

/// Structured JSON for errors when --json is enabled.
pub fn format_error_json(err: &eyre::Report) -> String {
    use plate_core::PlateError;
    use serde_json::json;

    let kind = match err.downcast_ref::<PlateError>() {
        Some(PlateError::Config(_)) => "config",
        Some(PlateError::Device(_)) => "device",
        Some(PlateError::Timeout) => "timeout",
        Some(PlateError::Decode(_)) => "decode",
        Some(PlateError::State(_)) => "state",
        None => "other",
    };
    json!({
        "error": {
            "kind": kind,
            "message": err.to_string(),
            "help": humanize(err),
        }
    })
    .to_string()
}
