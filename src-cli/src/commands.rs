//! CLI command implementations.

use crate::client::ServiceClient;
use crate::colors;
use crate::exit_codes::ExitCode;
use serde_json::Value;
use vadrec_common::VadStatus;

/// Show current service status.
pub async fn status(json: bool) -> ExitCode {
    let client = ServiceClient::new();
    match client.status().await {
        Ok(status) => {
            print_status(&status, json);
            ExitCode::Success
        }
        Err(e) => {
            eprintln!("{}", colors::error(&e.to_string()));
            e.to_exit_code()
        }
    }
}

/// Start detection, with optional `key=value` option overrides.
pub async fn start(overrides: &[String], json: bool, quiet: bool) -> ExitCode {
    let body = match parse_overrides(overrides) {
        Ok(body) => body,
        Err(msg) => {
            eprintln!("{}", colors::error(&msg));
            return ExitCode::GeneralError;
        }
    };

    let client = ServiceClient::new();
    match client.start(body).await {
        Ok(status) => {
            if json {
                print_status(&status, true);
            } else if !quiet {
                println!("{}", colors::success("Voice detection started."));
            }
            ExitCode::Success
        }
        Err(e) => {
            eprintln!("{}", colors::error(&e.to_string()));
            match e {
                crate::client::ServiceError::RemoteError(_) => ExitCode::StartRejected,
                other => other.to_exit_code(),
            }
        }
    }
}

/// Stop detection and flush any in-progress segment.
pub async fn stop(json: bool, quiet: bool) -> ExitCode {
    let client = ServiceClient::new();
    match client.stop().await {
        Ok(status) => {
            if json {
                print_status(&status, true);
            } else if !quiet {
                println!("{}", colors::success("Voice detection stopped."));
                if let Some(ref path) = status.last_segment_path {
                    println!("Last segment: {}", colors::path(path));
                }
                println!("Segments saved: {}", status.segments_saved);
            }
            ExitCode::Success
        }
        Err(e) => {
            eprintln!("{}", colors::error(&e.to_string()));
            e.to_exit_code()
        }
    }
}

/// Show the options currently in effect on the service.
pub async fn options(json: bool) -> ExitCode {
    let client = ServiceClient::new();
    match client.options().await {
        Ok(options) => {
            if json {
                println!("{}", serde_json::to_string_pretty(&options).unwrap());
            } else {
                println!("Sample rate:             {}", options.rate);
                println!("Output directory:        {}", options.out_dir.display());
                println!("Model path:              {}", options.model_path.display());
                println!("Speech threshold:        {}", options.speech_threshold);
                println!("Silence threshold:       {}", options.silence_threshold);
                println!("Required speech frames:  {}", options.required_speech_frames);
                println!("Required silence frames: {}", options.required_silence_frames);
            }
            ExitCode::Success
        }
        Err(e) => {
            eprintln!("{}", colors::error(&e.to_string()));
            e.to_exit_code()
        }
    }
}

fn print_status(status: &VadStatus, json: bool) {
    if json {
        println!("{}", serde_json::to_string_pretty(status).unwrap());
        return;
    }
    let state = if status.running { "running" } else { "idle" };
    println!("State:          {}", colors::state(state));
    println!("Segments saved: {}", status.segments_saved);
    match status.last_segment_path {
        Some(ref path) => println!("Last segment:   {}", colors::path(path)),
        None => println!("Last segment:   {}", colors::dim("(none)")),
    }
}

/// Parse bare `key=value` pairs into a JSON object. Values that parse as
/// numbers are sent as numbers, everything else as strings; the service
/// validates the keys.
pub fn parse_overrides(pairs: &[String]) -> Result<Value, String> {
    let mut map = serde_json::Map::new();
    for pair in pairs {
        let (key, value) = pair
            .split_once('=')
            .ok_or_else(|| format!("expected key=value, got '{}'", pair))?;
        if key.is_empty() {
            return Err(format!("missing key in '{}'", pair));
        }
        map.insert(key.to_string(), coerce_value(value));
    }
    Ok(Value::Object(map))
}

fn coerce_value(raw: &str) -> Value {
    if let Ok(int) = raw.parse::<i64>() {
        return Value::Number(int.into());
    }
    if let Ok(float) = raw.parse::<f64>() {
        if let Some(number) = serde_json::Number::from_f64(float) {
            return Value::Number(number);
        }
    }
    Value::String(raw.to_string())
}
