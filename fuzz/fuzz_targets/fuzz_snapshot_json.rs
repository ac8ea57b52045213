#![no_main]

use libfuzzer_sys::fuzz_target;
use placegrid::EditorSnapshot;

fuzz_target!(|data: &[u8]| {
    let Ok(text) = std::str::from_utf8(data) else {
        return;
    };
    // Anything that decodes must satisfy every placement invariant.
    if let Ok(snapshot) = EditorSnapshot::from_json(text) {
        let state = snapshot.restore().expect("validated snapshot restores");
        assert_eq!(state.world().check_invariants(), Ok(()));
        assert_eq!(state.camera().check_invariants(), Ok(()));
        assert_eq!(state.ledger().store().check_invariants(), Ok(()));
    }
});
