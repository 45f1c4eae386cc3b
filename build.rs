fn main() {
    println!("cargo:rerun-if-env-changed=CONTAGION_RAIN_BUILD");

    let build_id = match std::env::var("CONTAGION_RAIN_BUILD") {
        Ok(v) if !v.is_empty() => v,
        _ => target_triple_label(),
    };

    println!("cargo:rustc-env=CONTAGION_RAIN_BUILD={}", build_id);
}

fn target_triple_label() -> String {
    let os_raw = std::env::var("CARGO_CFG_TARGET_OS").unwrap_or_else(|_| "unknown".to_string());
    let os = match os_raw.as_str() {
        "macos" => "darwin",
        other => other,
    };
    let arch = std::env::var("CARGO_CFG_TARGET_ARCH").unwrap_or_else(|_| "unknown".to_string());
    let profile = std::env::var("PROFILE").unwrap_or_else(|_| "unknown".to_string());

    format!("{os}-{arch}-{profile}")
}
