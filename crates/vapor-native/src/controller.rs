//! Raw controller-input types.
//!
//! Handles are opaque 64-bit values the SDK hands out; zero means "not
//! found". The data structs mirror the SDK's packed layouts so they can be
//! returned by value across the C boundary.

/// A connected controller.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default)]
pub struct ControllerHandle(pub u64);

impl ControllerHandle {
    /// Addresses every connected controller at once.
    pub const ALL: ControllerHandle = ControllerHandle(u64::MAX);
}

/// An in-game action set such as "Menu" or "Drive".
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct ActionSetHandle(pub u64);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct DigitalActionHandle(pub u64);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct AnalogActionHandle(pub u64);

macro_rules! impl_is_valid {
    ($($ty:ty),*) => {
        $(impl $ty {
            /// Zero is what the SDK returns for an unknown name.
            pub fn is_valid(self) -> bool {
                self.0 != 0
            }
        })*
    };
}

impl_is_valid!(ActionSetHandle, DigitalActionHandle, AnalogActionHandle);

/// Most origins the SDK reports for a single action.
pub const MAX_ORIGINS: usize = 8;

/// Most controllers the SDK tracks at once.
pub const MAX_CONTROLLERS: usize = 16;

/// A physical input the player bound an action to. Used to pick the
/// on-screen glyph for prompts like "Press [A] to jump".
///
/// Kept open-ended: newer SDKs append origins for new hardware, and those
/// pass through untouched.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default)]
pub struct ActionOrigin(pub i32);

impl ActionOrigin {
    pub const NONE: Self = Self(0);
    pub const A: Self = Self(1);
    pub const B: Self = Self(2);
    pub const X: Self = Self(3);
    pub const Y: Self = Self(4);
    pub const LEFT_BUMPER: Self = Self(5);
    pub const RIGHT_BUMPER: Self = Self(6);
    pub const LEFT_GRIP: Self = Self(7);
    pub const RIGHT_GRIP: Self = Self(8);
    pub const START: Self = Self(9);
    pub const BACK: Self = Self(10);
    pub const LEFT_PAD_TOUCH: Self = Self(11);
    pub const LEFT_PAD_SWIPE: Self = Self(12);
    pub const LEFT_PAD_CLICK: Self = Self(13);
    pub const LEFT_PAD_DPAD_NORTH: Self = Self(14);
    pub const LEFT_PAD_DPAD_SOUTH: Self = Self(15);
    pub const LEFT_PAD_DPAD_WEST: Self = Self(16);
    pub const LEFT_PAD_DPAD_EAST: Self = Self(17);
    pub const RIGHT_PAD_TOUCH: Self = Self(18);
    pub const RIGHT_PAD_SWIPE: Self = Self(19);
    pub const RIGHT_PAD_CLICK: Self = Self(20);
    pub const RIGHT_PAD_DPAD_NORTH: Self = Self(21);
    pub const RIGHT_PAD_DPAD_SOUTH: Self = Self(22);
    pub const RIGHT_PAD_DPAD_WEST: Self = Self(23);
    pub const RIGHT_PAD_DPAD_EAST: Self = Self(24);
    pub const LEFT_TRIGGER_PULL: Self = Self(25);
    pub const LEFT_TRIGGER_CLICK: Self = Self(26);
    pub const RIGHT_TRIGGER_PULL: Self = Self(27);
    pub const RIGHT_TRIGGER_CLICK: Self = Self(28);
    pub const LEFT_STICK_MOVE: Self = Self(29);
    pub const LEFT_STICK_CLICK: Self = Self(30);
    pub const LEFT_STICK_DPAD_NORTH: Self = Self(31);
    pub const LEFT_STICK_DPAD_SOUTH: Self = Self(32);
    pub const LEFT_STICK_DPAD_WEST: Self = Self(33);
    pub const LEFT_STICK_DPAD_EAST: Self = Self(34);
    pub const GYRO_MOVE: Self = Self(35);
    pub const GYRO_PITCH: Self = Self(36);
    pub const GYRO_YAW: Self = Self(37);
    pub const GYRO_ROLL: Self = Self(38);
    pub const PS4_X: Self = Self(39);
    pub const PS4_CIRCLE: Self = Self(40);
    pub const PS4_TRIANGLE: Self = Self(41);
    pub const PS4_SQUARE: Self = Self(42);
    pub const PS4_LEFT_BUMPER: Self = Self(43);
    pub const PS4_RIGHT_BUMPER: Self = Self(44);
    pub const PS4_OPTIONS: Self = Self(45);
    pub const PS4_SHARE: Self = Self(46);
    pub const PS4_LEFT_PAD_TOUCH: Self = Self(47);
    pub const PS4_LEFT_PAD_SWIPE: Self = Self(48);
    pub const PS4_LEFT_PAD_CLICK: Self = Self(49);
    pub const PS4_LEFT_PAD_DPAD_NORTH: Self = Self(50);
    pub const PS4_LEFT_PAD_DPAD_SOUTH: Self = Self(51);
    pub const PS4_LEFT_PAD_DPAD_WEST: Self = Self(52);
    pub const PS4_LEFT_PAD_DPAD_EAST: Self = Self(53);
    pub const PS4_RIGHT_PAD_TOUCH: Self = Self(54);
    pub const PS4_RIGHT_PAD_SWIPE: Self = Self(55);
    pub const PS4_RIGHT_PAD_CLICK: Self = Self(56);
    pub const PS4_RIGHT_PAD_DPAD_NORTH: Self = Self(57);
    pub const PS4_RIGHT_PAD_DPAD_SOUTH: Self = Self(58);
    pub const PS4_RIGHT_PAD_DPAD_WEST: Self = Self(59);
    pub const PS4_RIGHT_PAD_DPAD_EAST: Self = Self(60);
    pub const PS4_CENTER_PAD_TOUCH: Self = Self(61);
    pub const PS4_CENTER_PAD_SWIPE: Self = Self(62);
    pub const PS4_CENTER_PAD_CLICK: Self = Self(63);
    pub const PS4_CENTER_PAD_DPAD_NORTH: Self = Self(64);
    pub const PS4_CENTER_PAD_DPAD_SOUTH: Self = Self(65);
    pub const PS4_CENTER_PAD_DPAD_WEST: Self = Self(66);
    pub const PS4_CENTER_PAD_DPAD_EAST: Self = Self(67);
    pub const PS4_LEFT_TRIGGER_PULL: Self = Self(68);
    pub const PS4_LEFT_TRIGGER_CLICK: Self = Self(69);
    pub const PS4_RIGHT_TRIGGER_PULL: Self = Self(70);
    pub const PS4_RIGHT_TRIGGER_CLICK: Self = Self(71);
    pub const PS4_LEFT_STICK_MOVE: Self = Self(72);
    pub const PS4_LEFT_STICK_CLICK: Self = Self(73);
    pub const PS4_LEFT_STICK_DPAD_NORTH: Self = Self(74);
    pub const PS4_LEFT_STICK_DPAD_SOUTH: Self = Self(75);
    pub const PS4_LEFT_STICK_DPAD_WEST: Self = Self(76);
    pub const PS4_LEFT_STICK_DPAD_EAST: Self = Self(77);
    pub const PS4_RIGHT_STICK_MOVE: Self = Self(78);
    pub const PS4_RIGHT_STICK_CLICK: Self = Self(79);
    pub const PS4_RIGHT_STICK_DPAD_NORTH: Self = Self(80);
    pub const PS4_RIGHT_STICK_DPAD_SOUTH: Self = Self(81);
    pub const PS4_RIGHT_STICK_DPAD_WEST: Self = Self(82);
    pub const PS4_RIGHT_STICK_DPAD_EAST: Self = Self(83);
    pub const PS4_DPAD_NORTH: Self = Self(84);
    pub const PS4_DPAD_SOUTH: Self = Self(85);
    pub const PS4_DPAD_WEST: Self = Self(86);
    pub const PS4_DPAD_EAST: Self = Self(87);
    pub const PS4_GYRO_MOVE: Self = Self(88);
    pub const PS4_GYRO_PITCH: Self = Self(89);
    pub const PS4_GYRO_YAW: Self = Self(90);
    pub const PS4_GYRO_ROLL: Self = Self(91);
    pub const XBOX_ONE_A: Self = Self(92);
    pub const XBOX_ONE_B: Self = Self(93);
    pub const XBOX_ONE_X: Self = Self(94);
    pub const XBOX_ONE_Y: Self = Self(95);
    pub const XBOX_ONE_LEFT_BUMPER: Self = Self(96);
    pub const XBOX_ONE_RIGHT_BUMPER: Self = Self(97);
    pub const XBOX_ONE_MENU: Self = Self(98);
    pub const XBOX_ONE_VIEW: Self = Self(99);
    pub const XBOX_ONE_LEFT_TRIGGER_PULL: Self = Self(100);
    pub const XBOX_ONE_LEFT_TRIGGER_CLICK: Self = Self(101);
    pub const XBOX_ONE_RIGHT_TRIGGER_PULL: Self = Self(102);
    pub const XBOX_ONE_RIGHT_TRIGGER_CLICK: Self = Self(103);
    pub const XBOX_ONE_LEFT_STICK_MOVE: Self = Self(104);
    pub const XBOX_ONE_LEFT_STICK_CLICK: Self = Self(105);
    pub const XBOX_ONE_LEFT_STICK_DPAD_NORTH: Self = Self(106);
    pub const XBOX_ONE_LEFT_STICK_DPAD_SOUTH: Self = Self(107);
    pub const XBOX_ONE_LEFT_STICK_DPAD_WEST: Self = Self(108);
    pub const XBOX_ONE_LEFT_STICK_DPAD_EAST: Self = Self(109);
    pub const XBOX_ONE_RIGHT_STICK_MOVE: Self = Self(110);
    pub const XBOX_ONE_RIGHT_STICK_CLICK: Self = Self(111);
    pub const XBOX_ONE_RIGHT_STICK_DPAD_NORTH: Self = Self(112);
    pub const XBOX_ONE_RIGHT_STICK_DPAD_SOUTH: Self = Self(113);
    pub const XBOX_ONE_RIGHT_STICK_DPAD_WEST: Self = Self(114);
    pub const XBOX_ONE_RIGHT_STICK_DPAD_EAST: Self = Self(115);
    pub const XBOX_ONE_DPAD_NORTH: Self = Self(116);
    pub const XBOX_ONE_DPAD_SOUTH: Self = Self(117);
    pub const XBOX_ONE_DPAD_WEST: Self = Self(118);
    pub const XBOX_ONE_DPAD_EAST: Self = Self(119);
    pub const XBOX_360_A: Self = Self(120);
    pub const XBOX_360_B: Self = Self(121);
    pub const XBOX_360_X: Self = Self(122);
    pub const XBOX_360_Y: Self = Self(123);
    pub const XBOX_360_LEFT_BUMPER: Self = Self(124);
    pub const XBOX_360_RIGHT_BUMPER: Self = Self(125);
    pub const XBOX_360_START: Self = Self(126);
    pub const XBOX_360_BACK: Self = Self(127);
    pub const XBOX_360_LEFT_TRIGGER_PULL: Self = Self(128);
    pub const XBOX_360_LEFT_TRIGGER_CLICK: Self = Self(129);
    pub const XBOX_360_RIGHT_TRIGGER_PULL: Self = Self(130);
    pub const XBOX_360_RIGHT_TRIGGER_CLICK: Self = Self(131);
    pub const XBOX_360_LEFT_STICK_MOVE: Self = Self(132);
    pub const XBOX_360_LEFT_STICK_CLICK: Self = Self(133);
    pub const XBOX_360_LEFT_STICK_DPAD_NORTH: Self = Self(134);
    pub const XBOX_360_LEFT_STICK_DPAD_SOUTH: Self = Self(135);
    pub const XBOX_360_LEFT_STICK_DPAD_WEST: Self = Self(136);
    pub const XBOX_360_LEFT_STICK_DPAD_EAST: Self = Self(137);
    pub const XBOX_360_RIGHT_STICK_MOVE: Self = Self(138);
    pub const XBOX_360_RIGHT_STICK_CLICK: Self = Self(139);
    pub const XBOX_360_RIGHT_STICK_DPAD_NORTH: Self = Self(140);
    pub const XBOX_360_RIGHT_STICK_DPAD_SOUTH: Self = Self(141);
    pub const XBOX_360_RIGHT_STICK_DPAD_WEST: Self = Self(142);
    pub const XBOX_360_RIGHT_STICK_DPAD_EAST: Self = Self(143);
    pub const XBOX_360_DPAD_NORTH: Self = Self(144);
    pub const XBOX_360_DPAD_SOUTH: Self = Self(145);
    pub const XBOX_360_DPAD_WEST: Self = Self(146);
    pub const XBOX_360_DPAD_EAST: Self = Self(147);
    pub const STEAM_V2_A: Self = Self(148);
    pub const STEAM_V2_B: Self = Self(149);
    pub const STEAM_V2_X: Self = Self(150);
    pub const STEAM_V2_Y: Self = Self(151);
    pub const STEAM_V2_LEFT_BUMPER: Self = Self(152);
    pub const STEAM_V2_RIGHT_BUMPER: Self = Self(153);
    pub const STEAM_V2_LEFT_GRIP: Self = Self(154);
    pub const STEAM_V2_RIGHT_GRIP: Self = Self(155);
    pub const STEAM_V2_LEFT_GRIP_UPPER: Self = Self(156);
    pub const STEAM_V2_RIGHT_GRIP_UPPER: Self = Self(157);
    pub const STEAM_V2_LEFT_BUMPER_PRESSURE: Self = Self(158);
    pub const STEAM_V2_RIGHT_BUMPER_PRESSURE: Self = Self(159);
    pub const STEAM_V2_LEFT_GRIP_PRESSURE: Self = Self(160);
    pub const STEAM_V2_RIGHT_GRIP_PRESSURE: Self = Self(161);
    pub const STEAM_V2_LEFT_GRIP_UPPER_PRESSURE: Self = Self(162);
    pub const STEAM_V2_RIGHT_GRIP_UPPER_PRESSURE: Self = Self(163);
    pub const STEAM_V2_START: Self = Self(164);
    pub const STEAM_V2_BACK: Self = Self(165);
    pub const STEAM_V2_LEFT_PAD_TOUCH: Self = Self(166);
    pub const STEAM_V2_LEFT_PAD_SWIPE: Self = Self(167);
    pub const STEAM_V2_LEFT_PAD_CLICK: Self = Self(168);
    pub const STEAM_V2_LEFT_PAD_PRESSURE: Self = Self(169);
    pub const STEAM_V2_LEFT_PAD_DPAD_NORTH: Self = Self(170);
    pub const STEAM_V2_LEFT_PAD_DPAD_SOUTH: Self = Self(171);
    pub const STEAM_V2_LEFT_PAD_DPAD_WEST: Self = Self(172);
    pub const STEAM_V2_LEFT_PAD_DPAD_EAST: Self = Self(173);
    pub const STEAM_V2_RIGHT_PAD_TOUCH: Self = Self(174);
    pub const STEAM_V2_RIGHT_PAD_SWIPE: Self = Self(175);
    pub const STEAM_V2_RIGHT_PAD_CLICK: Self = Self(176);
    pub const STEAM_V2_RIGHT_PAD_PRESSURE: Self = Self(177);
    pub const STEAM_V2_RIGHT_PAD_DPAD_NORTH: Self = Self(178);
    pub const STEAM_V2_RIGHT_PAD_DPAD_SOUTH: Self = Self(179);
    pub const STEAM_V2_RIGHT_PAD_DPAD_WEST: Self = Self(180);
    pub const STEAM_V2_RIGHT_PAD_DPAD_EAST: Self = Self(181);
    pub const STEAM_V2_LEFT_TRIGGER_PULL: Self = Self(182);
    pub const STEAM_V2_LEFT_TRIGGER_CLICK: Self = Self(183);
    pub const STEAM_V2_RIGHT_TRIGGER_PULL: Self = Self(184);
    pub const STEAM_V2_RIGHT_TRIGGER_CLICK: Self = Self(185);
    pub const STEAM_V2_LEFT_STICK_MOVE: Self = Self(186);
    pub const STEAM_V2_LEFT_STICK_CLICK: Self = Self(187);
    pub const STEAM_V2_LEFT_STICK_DPAD_NORTH: Self = Self(188);
    pub const STEAM_V2_LEFT_STICK_DPAD_SOUTH: Self = Self(189);
    pub const STEAM_V2_LEFT_STICK_DPAD_WEST: Self = Self(190);
    pub const STEAM_V2_LEFT_STICK_DPAD_EAST: Self = Self(191);
    pub const STEAM_V2_GYRO_MOVE: Self = Self(192);
    pub const STEAM_V2_GYRO_PITCH: Self = Self(193);
    pub const STEAM_V2_GYRO_YAW: Self = Self(194);
    pub const STEAM_V2_GYRO_ROLL: Self = Self(195);
}

/// How a physical input is configured to behave.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SourceMode {
    #[default]
    None,
    Dpad,
    Buttons,
    FourButtons,
    AbsoluteMouse,
    RelativeMouse,
    JoystickMove,
    JoystickMouse,
    JoystickCamera,
    ScrollWheel,
    Trigger,
    TouchMenu,
    MouseJoystick,
    MouseRegion,
    RadialMenu,
    SingleButton,
    Switches,
    Unknown(i32),
}

impl SourceMode {
    const KNOWN: [SourceMode; 17] = [
        Self::None,
        Self::Dpad,
        Self::Buttons,
        Self::FourButtons,
        Self::AbsoluteMouse,
        Self::RelativeMouse,
        Self::JoystickMove,
        Self::JoystickMouse,
        Self::JoystickCamera,
        Self::ScrollWheel,
        Self::Trigger,
        Self::TouchMenu,
        Self::MouseJoystick,
        Self::MouseRegion,
        Self::RadialMenu,
        Self::SingleButton,
        Self::Switches,
    ];

    pub fn from_raw(raw: i32) -> Self {
        usize::try_from(raw)
            .ok()
            .and_then(|i| Self::KNOWN.get(i).copied())
            .unwrap_or(Self::Unknown(raw))
    }

    pub fn raw(self) -> i32 {
        match self {
            Self::Unknown(raw) => raw,
            known => Self::KNOWN
                .iter()
                .position(|k| *k == known)
                .map_or(-1, |i| i as i32),
        }
    }
}

/// Which trackpad a haptic pulse plays on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ControllerPad {
    Left,
    Right,
}

impl ControllerPad {
    pub fn raw(self) -> i32 {
        match self {
            Self::Left => 0,
            Self::Right => 1,
        }
    }
}

/// What `set_led_color` should do with the color it is given.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LedFlag {
    SetColor,
    /// Ignore the color and go back to the user's own setting.
    RestoreUserDefault,
}

impl LedFlag {
    pub fn raw(self) -> u32 {
        match self {
            Self::SetColor => 0,
            Self::RestoreUserDefault => 1,
        }
    }
}

/// `InputDigitalActionData_t`.
#[repr(C, packed)]
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct DigitalActionDataRaw {
    pub state: bool,
    pub active: bool,
}

/// `InputAnalogActionData_t`.
#[repr(C, packed)]
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct AnalogActionDataRaw {
    pub mode: i32,
    pub x: f32,
    pub y: f32,
    pub active: bool,
}

/// `InputMotionData_t`: orientation quaternion, positional acceleration
/// and angular velocity, in that order.
#[repr(C, packed)]
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct MotionDataRaw {
    pub rot_quat_x: f32,
    pub rot_quat_y: f32,
    pub rot_quat_z: f32,
    pub rot_quat_w: f32,
    pub pos_accel_x: f32,
    pub pos_accel_y: f32,
    pub pos_accel_z: f32,
    pub rot_vel_x: f32,
    pub rot_vel_y: f32,
    pub rot_vel_z: f32,
}
