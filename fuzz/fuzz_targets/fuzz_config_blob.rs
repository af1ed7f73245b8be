//! Fuzz target: `TokenConfig::load`
//!
//! Writes arbitrary bytes where the configuration blob lives and loads
//! it back. Whatever the EEPROM contains, loading must not panic and
//! must yield a configuration that passes validation (corrupt blobs
//! fall back to defaults).
//!
//! cargo fuzz run fuzz_config_blob

#![no_main]

use authfob::adapters::eeprom::InMemoryEeprom;
use authfob::app::ports::SecureStorePort;
use authfob::config::{CONFIG_ADDR, TokenConfig};
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    let mut eeprom = InMemoryEeprom::new();
    let chunk = &data[..data.len().min(32)];
    if eeprom.write(CONFIG_ADDR, chunk).is_err() {
        return;
    }

    let cfg = TokenConfig::load(&eeprom);
    assert!(cfg.validate().is_ok());
});
