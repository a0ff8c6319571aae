// Browser smoke tests. Run with `wasm-pack test --headless --chrome`.

#![cfg(target_arch = "wasm32")]

use wasm_bindgen_test::*;

wasm_bindgen_test_configure!(run_in_browser);

fn mount_canvas(id: &str) {
    let document = web_sys::window().unwrap().document().unwrap();
    let canvas = document.create_element("canvas").unwrap();
    canvas.set_id(id);
    document.body().unwrap().append_child(&canvas).unwrap();
}

#[wasm_bindgen_test]
fn framework_builds_against_a_dom_canvas() {
    mount_canvas("spinlab-canvas");
    let framework = spinlab::WasmFramework::with_builtin_game("spinlab-canvas", "{}").unwrap();
    let state = framework.state_json().unwrap();
    assert!(state.contains("\"balance\":1000"));
}

#[wasm_bindgen_test]
fn missing_canvas_is_an_error_not_a_panic() {
    let result = spinlab::WasmFramework::new("no-such-element", "{}");
    assert!(result.is_err());
}

#[wasm_bindgen_test]
fn bridge_spin_settles_through_complete_spin() {
    mount_canvas("spinlab-bridge-canvas");
    let mut framework = spinlab::WasmFramework::new("spinlab-bridge-canvas", "{}").unwrap();
    framework.spin().unwrap();
    assert_eq!(framework.spin_button_label(), "SPINNING...");

    framework.complete_spin(r#"{"is_win": false}"#);
    assert_eq!(framework.spin_button_label(), "SPIN");
}
