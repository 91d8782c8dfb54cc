//! Home-security alarm
//!
//! ```text
//!            brief press                 motion
//! DISARMED ─────────────► ARMED ─────────────────► TRIGGERED
//!    ▲  ▲                  │  ▲                        │
//!    │  └──brief or held───┘  └──────brief press───────┤
//!    └─────────────────────held press──────────────────┘
//! ```
//!
//! The button and motion sensor only raise flags from interrupt context.
//! Every transition happens in [`Alarm::poll`].

use leafy_core::config::AlarmConfig;
use leafy_core::time::Interval;
use leafy_core::{Board, BusDriver, ButtonEvents, Color, EventFlag, GpioExt};
use leafy_hal::{Clock, Edge, ExtiController, Level, Millis, Pin, PinMode, PortId, PortMap};

use crate::app::App;

/// Red LED
pub const LED_RED: Pin = Pin::new(PortId::B, 9);
/// Green LED
pub const LED_GREEN: Pin = Pin::new(PortId::C, 7);
/// Blue LED
pub const LED_BLUE: Pin = Pin::new(PortId::B, 7);
/// Arm/disarm button, high while pressed
pub const BUTTON: Pin = Pin::new(PortId::C, 13);
/// Motion sensor, rising edge on detection
pub const MOTION: Pin = Pin::new(PortId::B, 8);

/// Alarm state
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum AlarmState {
    Disarmed,
    Armed,
    Triggered,
}

/// Interrupt-side event producers
///
/// Kept in a `static` so the interrupt table can refer to it.
pub struct AlarmInputs<C: Clock> {
    pub button: ButtonEvents<C>,
    pub motion: EventFlag,
}

impl<C: Clock> AlarmInputs<C> {
    pub const fn new(clock: C) -> Self {
        Self {
            button: ButtonEvents::new(clock),
            motion: EventFlag::new(),
        }
    }
}

/// Alarm state machine
pub struct Alarm<C: Clock + Sync + 'static> {
    inputs: &'static AlarmInputs<C>,
    config: AlarmConfig,
    state: AlarmState,
    toggle: Interval,
    blue_phase: bool,
}

impl<C: Clock + Sync + 'static> Alarm<C> {
    pub fn new(inputs: &'static AlarmInputs<C>, config: AlarmConfig) -> Self {
        Self {
            inputs,
            config,
            state: AlarmState::Disarmed,
            toggle: Interval::new(config.toggle_ms, Millis::ZERO),
            blue_phase: false,
        }
    }

    pub fn state(&self) -> AlarmState {
        self.state
    }

    fn leds<M: PortMap>(board: &mut M, red: bool, green: bool, blue: bool) {
        board.write(LED_RED, Level::from(red));
        board.write(LED_GREEN, Level::from(green));
        board.write(LED_BLUE, Level::from(blue));
    }

    fn arm<P: PortMap, D: BusDriver, E: ExtiController>(
        &mut self,
        board: &mut Board<P, D, E>,
        now: Millis,
    ) {
        self.state = AlarmState::Armed;
        self.toggle.reset(now);
        self.blue_phase = false;
        // Motion seen while not armed never counts
        self.inputs.motion.clear();
        Self::leds(board, false, true, false);
        board.set_color(Color::YELLOW);
        board.set_line_text(0, "ARMED");
    }

    fn disarm<P: PortMap, D: BusDriver, E: ExtiController>(&mut self, board: &mut Board<P, D, E>) {
        self.state = AlarmState::Disarmed;
        Self::leds(board, false, false, false);
        board.set_color(Color::WHITE);
        board.set_line_text(0, "DISARMED");
    }

    fn trigger<P: PortMap, D: BusDriver, E: ExtiController>(&mut self, board: &mut Board<P, D, E>) {
        self.state = AlarmState::Triggered;
        Self::leds(board, true, false, false);
        board.set_color(Color::RED);
        board.set_line_text(0, "TRIGGERED");
    }
}

impl<C: Clock + Sync + 'static> App for Alarm<C> {
    fn init<P: PortMap, D: BusDriver, E: ExtiController>(
        &mut self,
        board: &mut Board<P, D, E>,
        _now: Millis,
    ) {
        let inputs = self.inputs;
        inputs.button.set_timing(self.config.button_timing());
        inputs.button.reset();
        inputs.motion.clear();

        for led in [LED_RED, LED_GREEN, LED_BLUE] {
            board.configure(led, PinMode::Output);
        }
        board.configure(BUTTON, PinMode::Input);
        board.configure(MOTION, PinMode::Input);

        board.register_interrupt(MOTION, &inputs.motion, Edge::Rising);
        board.register_interrupt(BUTTON, &inputs.button, Edge::Rising);
        board.register_interrupt(BUTTON, &inputs.button, Edge::Falling);

        // The bus is idle at boot; a refused init is retried by the display
        let _ = board.enable_display();
        self.disarm(board);
    }

    fn poll<P: PortMap, D: BusDriver, E: ExtiController>(
        &mut self,
        board: &mut Board<P, D, E>,
        now: Millis,
    ) {
        let inputs = self.inputs;
        let button = &inputs.button;
        let motion = &inputs.motion;

        match self.state {
            AlarmState::Disarmed => {
                motion.clear();
                if button.take_brief() {
                    self.arm(board, now);
                }
            }
            AlarmState::Armed => {
                if button.take_held(now, self.config.held_ms) || button.take_brief() {
                    self.disarm(board);
                    return;
                }
                if motion.take() {
                    self.trigger(board);
                    return;
                }
                if self.toggle.poll(now) {
                    self.blue_phase = !self.blue_phase;
                    Self::leds(board, false, !self.blue_phase, self.blue_phase);
                }
            }
            AlarmState::Triggered => {
                motion.clear();
                if button.take_brief() {
                    self.arm(board, now);
                    return;
                }
                if button.take_held(now, self.config.held_ms) {
                    self.disarm(board);
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use leafy_core::gpio::InterruptTable;
    use leafy_core::mocks::{MockBoard, MockBus, MockClock, MockExti, MockPorts};
    use leafy_core::{BoardTransfers, RefreshPolicy};

    struct Rig {
        clock: &'static MockClock,
        table: &'static InterruptTable,
        board: MockBoard,
        alarm: Alarm<&'static MockClock>,
    }

    impl Rig {
        fn new(
            clock: &'static MockClock,
            inputs: &'static AlarmInputs<&'static MockClock>,
            table: &'static InterruptTable,
            transfers: &'static BoardTransfers,
        ) -> Self {
            let mut board = MockBoard::new(
                MockPorts::new(),
                MockBus::instant(),
                MockExti::new(),
                table,
                transfers,
                RefreshPolicy::Always,
            );
            let mut alarm = Alarm::new(inputs, AlarmConfig::default());
            alarm.init(&mut board, clock.now());
            board.service();
            Self {
                clock,
                table,
                board,
                alarm,
            }
        }

        /// Raise an edge on a line as the hardware would and service it
        fn edge(&mut self, line: u8, edge: Edge) {
            self.board.exti().trigger(line, edge);
            self.table.dispatch(self.board.exti(), line);
        }

        fn tick(&mut self, at: u32) {
            self.clock.set(Millis(at));
            self.alarm.poll(&mut self.board, Millis(at));
            self.board.service();
        }

        fn press(&mut self, at: u32) {
            self.clock.set(Millis(at));
            self.edge(13, Edge::Rising);
        }

        fn release(&mut self, at: u32) {
            self.clock.set(Millis(at));
            self.edge(13, Edge::Falling);
        }

        fn motion(&mut self) {
            self.edge(8, Edge::Rising);
        }

        fn led(&self, pin: Pin) -> bool {
            self.board.ports().output(pin.port) & pin.mask() != 0
        }

        fn text(&self) -> &str {
            self.board.display().line_text(0).unwrap_or("")
        }
    }

    macro_rules! rig {
        () => {{
            static CLOCK: MockClock = MockClock::new();
            static INPUTS: AlarmInputs<&'static MockClock> = AlarmInputs::new(&CLOCK);
            static TABLE: InterruptTable = InterruptTable::new();
            static T: BoardTransfers = BoardTransfers::new();
            Rig::new(&CLOCK, &INPUTS, &TABLE, &T)
        }};
    }

    #[test]
    fn test_init_registers_interrupts() {
        let rig = rig!();
        assert!(rig.table.is_registered(13, Edge::Rising));
        assert!(rig.table.is_registered(13, Edge::Falling));
        assert!(rig.table.is_registered(8, Edge::Rising));
        assert_eq!(rig.board.exti().routed_port(13), Some(PortId::C));
        assert_eq!(rig.alarm.state(), AlarmState::Disarmed);
        assert_eq!(rig.text(), "DISARMED        ");
        assert_eq!(rig.board.display().color(), Color::WHITE);
    }

    #[test]
    fn test_alarm_scenario() {
        let mut rig = rig!();

        // Brief press arms: green on, blue off
        rig.press(1000);
        rig.tick(1100);
        rig.release(1400);
        rig.tick(1401);
        assert_eq!(rig.alarm.state(), AlarmState::Armed);
        assert!(rig.led(LED_GREEN));
        assert!(!rig.led(LED_BLUE));
        assert!(!rig.led(LED_RED));
        assert_eq!(rig.text(), "ARMED           ");
        assert_eq!(rig.board.display().color(), Color::YELLOW);

        // Motion triggers: red on
        rig.motion();
        rig.tick(1500);
        assert_eq!(rig.alarm.state(), AlarmState::Triggered);
        assert!(rig.led(LED_RED));
        assert!(!rig.led(LED_GREEN));
        assert_eq!(rig.text(), "TRIGGERED       ");

        // Held press disarms at 3000 ms, before release
        rig.press(2000);
        rig.tick(4999);
        assert_eq!(rig.alarm.state(), AlarmState::Triggered);
        rig.tick(5000);
        assert_eq!(rig.alarm.state(), AlarmState::Disarmed);
        assert!(!rig.led(LED_RED));

        // The release that ends the hold is not a brief press
        rig.release(5200);
        rig.tick(5201);
        assert_eq!(rig.alarm.state(), AlarmState::Disarmed);
    }

    #[test]
    fn test_armed_leds_alternate() {
        let mut rig = rig!();
        rig.press(0);
        rig.release(100);
        rig.tick(100);
        assert_eq!(rig.alarm.state(), AlarmState::Armed);

        rig.tick(1099);
        assert!(rig.led(LED_GREEN) && !rig.led(LED_BLUE));
        rig.tick(1100);
        assert!(!rig.led(LED_GREEN) && rig.led(LED_BLUE));
        rig.tick(2100);
        assert!(rig.led(LED_GREEN) && !rig.led(LED_BLUE));
    }

    #[test]
    fn test_brief_press_disarms_from_armed() {
        let mut rig = rig!();
        rig.press(0);
        rig.release(100);
        rig.tick(100);

        rig.press(500);
        rig.release(700);
        rig.tick(701);
        assert_eq!(rig.alarm.state(), AlarmState::Disarmed);
    }

    #[test]
    fn test_brief_press_rearms_from_triggered() {
        let mut rig = rig!();
        rig.press(0);
        rig.release(100);
        rig.tick(100);
        rig.motion();
        rig.tick(200);
        assert_eq!(rig.alarm.state(), AlarmState::Triggered);

        rig.press(300);
        rig.release(400);
        rig.tick(401);
        assert_eq!(rig.alarm.state(), AlarmState::Armed);
        assert!(rig.led(LED_GREEN) && !rig.led(LED_RED));
    }

    #[test]
    fn test_motion_while_disarmed_is_discarded() {
        let mut rig = rig!();
        rig.motion();
        rig.tick(10);

        rig.press(100);
        rig.release(200);
        rig.tick(201);
        assert_eq!(rig.alarm.state(), AlarmState::Armed);
        rig.tick(202);
        assert_eq!(rig.alarm.state(), AlarmState::Armed);
    }

    #[test]
    fn test_long_release_does_not_arm() {
        let mut rig = rig!();
        rig.press(0);
        rig.tick(1000);
        rig.release(2500);
        rig.tick(2501);
        assert_eq!(rig.alarm.state(), AlarmState::Disarmed);
    }
}
