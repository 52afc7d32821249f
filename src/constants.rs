// Network
pub const SERVER_PORT: u16 = 1777;
pub const LISTEN_BACKLOG: i32 = 10;

// Commands (client -> server, one byte each)
pub const CMD_STOP: u8 = b's';
pub const CMD_SHUTDOWN: u8 = b'q';
pub const CMD_POLL: u8 = b'i';

// Raw joystick axis range (unsigned, 0..=AXIS_RAW_MAX)
pub const AXIS_RAW_MAX: u32 = 65534;
pub const AXIS_MIDPOINT: f32 = 32767.0;

// Stick magnitudes below this snap to zero
pub const DEFAULT_DEADZONE: f32 = 0.2;

// Point-of-view hat, hundredths of a degree
pub mod pov {
    pub const UP: u32 = 0;
    pub const RIGHT: u32 = 9000;
    pub const DOWN: u32 = 18000;
    pub const LEFT: u32 = 27000;
    pub const CENTERED: u32 = 0xFFFF;
}

// Snapshot button bits
pub mod button_bits {
    pub const TRIANGLE: u32 = 0;
    pub const CIRCLE: u32 = 1;
    pub const CROSS: u32 = 2;
    pub const SQUARE: u32 = 3;
    pub const L2: u32 = 4;
    pub const R2: u32 = 5;
    pub const L1: u32 = 6;
    pub const R1: u32 = 7;
    pub const SELECT: u32 = 8;
    pub const START: u32 = 9;
    pub const L3: u32 = 10;
    pub const R3: u32 = 11;
    pub const LEFT: u32 = 12;
    pub const RIGHT: u32 = 13;
    pub const UP: u32 = 14;
    pub const DOWN: u32 = 15;
}
