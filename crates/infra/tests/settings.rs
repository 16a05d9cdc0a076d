use anyhow::Result;

use stockval_core::Currency;
use stockval_infra::Settings;
use stockval_infra::adapters::InMemorySequenceGenerator;
use stockval_inventory::{REVALUATION_SEQUENCE, SequenceGenerator};

// Only test in this binary: it owns the process environment.
#[test]
fn settings_are_read_from_the_process_environment() -> Result<()> {
    // SAFETY: no other thread of this test binary reads or writes the environment.
    unsafe {
        std::env::set_var("STOCKVAL__CURRENCY__CODE", "JPY");
        std::env::set_var("STOCKVAL__CURRENCY__DECIMAL_PLACES", "0");
        std::env::set_var("STOCKVAL__SEQUENCE__PADDING", "3");
    }

    let settings = Settings::load()?;
    assert_eq!(settings.currency.currency(), Currency::new("JPY", 0));
    assert_eq!(settings.sequence.revaluation_prefix, "REV/");

    let sequences = InMemorySequenceGenerator::from_settings(&settings.sequence);
    assert_eq!(sequences.next_by_code(REVALUATION_SEQUENCE)?.as_deref(), Some("REV/001"));
    Ok(())
}
