use std::sync::Arc;
use std::time::Duration;

use vapor_controller::{
    ActionOrigin, ActionSetHandle, AnalogActionData, AnalogActionHandle, ControllerError,
    ControllerHandle, ControllerPad, Controllers, DigitalActionData, SourceMode,
};
use vapor_native::{AnalogActionDataRaw, ControllerCommand, FakeNative, LedFlag, MotionDataRaw};
use vapor_runtime::Context;

const PAD_A: ControllerHandle = ControllerHandle(11);
const PAD_B: ControllerHandle = ControllerHandle(22);

fn setup() -> (Arc<FakeNative>, Context, Controllers) {
    let fake = Arc::new(FakeNative::new());
    let ctx = Context::new(fake.clone());
    let controllers = Controllers::new(ctx.clone());
    (fake, ctx, controllers)
}

fn started() -> (Arc<FakeNative>, Context, Controllers) {
    let (fake, ctx, controllers) = setup();
    controllers.init().unwrap();
    (fake, ctx, controllers)
}

// =========================================================================
// Init
// =========================================================================

#[test]
fn test_queries_before_init_return_not_initialized() {
    let (_fake, _ctx, controllers) = setup();

    assert_eq!(controllers.connected().unwrap_err(), ControllerError::NotInitialized);
    assert_eq!(controllers.run_frame(), Err(ControllerError::NotInitialized));
    assert_eq!(
        controllers.action_set("Menu"),
        Err(ControllerError::NotInitialized)
    );
}

#[test]
fn test_init_shared_by_handles_on_one_context() {
    let (fake, ctx, first) = setup();
    let second = Controllers::new(ctx.clone());

    first.init().unwrap();
    second.init().unwrap();

    assert!(second.is_initialized());
    assert_eq!(fake.controller_inits(), 1);
}

#[test]
fn test_once_group_reset_shuts_controller_subsystem_down() {
    let (fake, ctx, controllers) = started();

    ctx.once_group().reset();
    assert_eq!(fake.controller_shutdowns(), 1);
    assert!(!controllers.is_initialized());

    controllers.init().unwrap();
    assert_eq!(fake.controller_inits(), 2);
}

#[test]
fn test_run_frame_reaches_native() {
    let (fake, _ctx, controllers) = started();
    controllers.run_frame().unwrap();
    assert_eq!(fake.controller_frames(), 1);
}

// =========================================================================
// Devices and handles
// =========================================================================

#[test]
fn test_connected_lists_controllers_in_order() {
    let (fake, _ctx, controllers) = started();
    fake.connect_controller(PAD_A);
    fake.connect_controller(PAD_B);

    let handles: Vec<_> = controllers
        .connected()
        .unwrap()
        .iter()
        .map(|c| c.handle())
        .collect();
    assert_eq!(handles, vec![PAD_A, PAD_B]);
}

#[test]
fn test_gamepad_index_lookup_both_ways() {
    let (fake, _ctx, controllers) = started();
    fake.connect_controller(PAD_A);

    let pad = controllers.for_gamepad_index(0).unwrap().unwrap();
    assert_eq!(pad.handle(), PAD_A);
    assert_eq!(pad.gamepad_index(), Some(0));
    assert!(controllers.for_gamepad_index(3).unwrap().is_none());
}

#[test]
fn test_unknown_names_are_errors() {
    let (fake, _ctx, controllers) = started();
    fake.define_action("Drive", 5);
    fake.define_action("steer", 6);

    assert_eq!(controllers.action_set("Drive"), Ok(ActionSetHandle(5)));
    assert_eq!(controllers.analog_action("steer"), Ok(AnalogActionHandle(6)));
    assert_eq!(
        controllers.action_set("Fly"),
        Err(ControllerError::UnknownActionSet("Fly".into()))
    );
    assert_eq!(
        controllers.digital_action("jump"),
        Err(ControllerError::UnknownAction("jump".into()))
    );
}

// =========================================================================
// Action sets and state
// =========================================================================

#[test]
fn test_activate_action_set_on_all_switches_every_controller() {
    let (fake, _ctx, controllers) = started();
    fake.connect_controller(PAD_A);
    fake.connect_controller(PAD_B);
    fake.define_action("Menu", 9);
    let menu = controllers.action_set("Menu").unwrap();

    controllers.all().unwrap().activate_action_set(menu);

    for pad in controllers.connected().unwrap() {
        assert_eq!(pad.current_action_set(), menu);
    }
}

#[test]
fn test_digital_and_analog_state_read_back() {
    let (fake, _ctx, controllers) = started();
    fake.connect_controller(PAD_A);
    fake.define_action("jump", 1);
    fake.define_action("move", 2);
    let jump = controllers.digital_action("jump").unwrap();
    let movement = controllers.analog_action("move").unwrap();
    fake.set_digital_action(PAD_A, jump, true, true);
    fake.set_analog_action(
        PAD_A,
        movement,
        AnalogActionDataRaw {
            mode: 6,
            x: 0.25,
            y: 1.0,
            active: true,
        },
    );

    let pad = &controllers.connected().unwrap()[0];
    assert_eq!(
        pad.digital(jump),
        DigitalActionData {
            pressed: true,
            active: true
        }
    );
    assert_eq!(
        pad.analog(movement),
        AnalogActionData {
            mode: SourceMode::JoystickMove,
            x: 0.25,
            y: 1.0,
            active: true
        }
    );
}

#[test]
fn test_origins_are_scoped_to_action_set() {
    let (fake, _ctx, controllers) = started();
    fake.connect_controller(PAD_A);
    fake.define_action("Drive", 3);
    fake.define_action("Walk", 4);
    fake.define_action("jump", 1);
    let drive = controllers.action_set("Drive").unwrap();
    let walk = controllers.action_set("Walk").unwrap();
    let jump = controllers.digital_action("jump").unwrap();
    fake.set_action_origins(PAD_A, drive, jump.0, vec![ActionOrigin::A, ActionOrigin::XBOX_ONE_A]);

    let pad = &controllers.connected().unwrap()[0];
    assert_eq!(
        pad.digital_origins(drive, jump),
        vec![ActionOrigin::A, ActionOrigin::XBOX_ONE_A]
    );
    assert!(pad.digital_origins(walk, jump).is_empty());
}

#[test]
fn test_disconnected_controller_reads_inactive() {
    let (_fake, _ctx, controllers) = started();
    let pad = controllers.all().unwrap();
    assert_eq!(pad.digital(Default::default()), DigitalActionData::default());
}

#[test]
fn test_motion_read_back() {
    let (fake, _ctx, controllers) = started();
    fake.connect_controller(PAD_A);
    fake.set_motion(
        PAD_A,
        MotionDataRaw {
            rot_quat_w: 1.0,
            rot_vel_z: 0.5,
            ..Default::default()
        },
    );

    let motion = controllers.connected().unwrap()[0].motion();
    assert_eq!(motion.rotation, [0.0, 0.0, 0.0, 1.0]);
    assert_eq!(motion.angular_velocity, [0.0, 0.0, 0.5]);
}

// =========================================================================
// Output
// =========================================================================

#[test]
fn test_haptics_vibration_and_led_reach_native_in_order() {
    let (fake, _ctx, controllers) = started();
    fake.connect_controller(PAD_A);
    fake.define_action("move", 2);
    let movement = controllers.analog_action("move").unwrap();
    let pad = &controllers.connected().unwrap()[0];

    pad.haptic_pulse(ControllerPad::Left, Duration::from_millis(2));
    pad.repeated_haptic_pulse(
        ControllerPad::Right,
        Duration::from_micros(300),
        Duration::from_micros(100),
        4,
    );
    pad.vibrate(1000, 0);
    pad.set_led_color([255, 0, 64]);
    pad.restore_led_color();
    pad.stop_momentum(movement);

    assert_eq!(
        fake.controller_commands(),
        vec![
            ControllerCommand::HapticPulse {
                controller: PAD_A,
                pad: ControllerPad::Left,
                micros: 2000,
            },
            ControllerCommand::RepeatedHapticPulse {
                controller: PAD_A,
                pad: ControllerPad::Right,
                on_micros: 300,
                off_micros: 100,
                repeat: 4,
            },
            ControllerCommand::Vibration {
                controller: PAD_A,
                left_speed: 1000,
                right_speed: 0,
            },
            ControllerCommand::LedColor {
                controller: PAD_A,
                rgb: [255, 0, 64],
                flag: LedFlag::SetColor,
            },
            ControllerCommand::LedColor {
                controller: PAD_A,
                rgb: [0, 0, 0],
                flag: LedFlag::RestoreUserDefault,
            },
            ControllerCommand::StopMomentum(PAD_A, movement),
        ]
    );
}

#[test]
fn test_show_binding_panel_false_for_missing_controller() {
    let (fake, _ctx, controllers) = started();
    fake.connect_controller(PAD_A);

    assert!(controllers.connected().unwrap()[0].show_binding_panel());
    assert!(!controllers.all().unwrap().show_binding_panel());
}

// =========================================================================
// Glyphs
// =========================================================================

#[test]
fn test_glyph_none_for_unbound_origin() {
    let (_fake, _ctx, controllers) = started();

    assert_eq!(controllers.glyph(ActionOrigin::NONE), None);
    assert_eq!(
        controllers.glyph(ActionOrigin::PS4_X).as_deref(),
        Some("glyphs/origin_39.png")
    );
    assert_eq!(controllers.origin_name(ActionOrigin::A), "Origin 1");
}
