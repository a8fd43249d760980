#![no_main]
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &str| {
    // Config parsing must never panic; bad input is rejected through Result.
    let parsed = toml::from_str::<plate_config::Config>(data);
    match parsed {
        Ok(cfg) => {
            // validate() must also reject gracefully
            let _ = cfg.validate();
        }
        Err(_e) => {
            // parse error is acceptable
        }
    }
});
