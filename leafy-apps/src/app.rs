//! Application trait and the poll-loop runner

use leafy_core::config::{AppKind, BoardConfig};
use leafy_core::{Board, BusDriver};
use leafy_hal::{Clock, ExtiController, Millis, PortMap};

use crate::alarm::{Alarm, AlarmInputs};
use crate::pong::{duel::DuelPong, linear::LinearPong};

/// A state machine driven by the poll loop
pub trait App {
    /// One-time setup: pins, interrupts, display
    fn init<P: PortMap, D: BusDriver, E: ExtiController>(
        &mut self,
        board: &mut Board<P, D, E>,
        now: Millis,
    );

    /// Advance by one tick. Must not block.
    fn poll<P: PortMap, D: BusDriver, E: ExtiController>(
        &mut self,
        board: &mut Board<P, D, E>,
        now: Millis,
    );
}

/// The application selected by the board configuration
pub enum AnyApp<C: Clock + Sync + 'static> {
    Alarm(Alarm<C>),
    Pong(LinearPong),
    Duel(DuelPong),
}

impl<C: Clock + Sync + 'static> AnyApp<C> {
    /// Build the configured application
    pub fn from_config(config: &BoardConfig, alarm_inputs: &'static AlarmInputs<C>) -> Self {
        match config.app {
            AppKind::Alarm => AnyApp::Alarm(Alarm::new(alarm_inputs, config.alarm)),
            AppKind::Pong => AnyApp::Pong(LinearPong::new(config.pong)),
            AppKind::Duel => AnyApp::Duel(DuelPong::new(config.pong)),
        }
    }

    pub fn kind(&self) -> AppKind {
        match self {
            AnyApp::Alarm(_) => AppKind::Alarm,
            AnyApp::Pong(_) => AppKind::Pong,
            AnyApp::Duel(_) => AppKind::Duel,
        }
    }
}

impl<C: Clock + Sync + 'static> App for AnyApp<C> {
    fn init<P: PortMap, D: BusDriver, E: ExtiController>(
        &mut self,
        board: &mut Board<P, D, E>,
        now: Millis,
    ) {
        match self {
            AnyApp::Alarm(app) => app.init(board, now),
            AnyApp::Pong(app) => app.init(board, now),
            AnyApp::Duel(app) => app.init(board, now),
        }
    }

    fn poll<P: PortMap, D: BusDriver, E: ExtiController>(
        &mut self,
        board: &mut Board<P, D, E>,
        now: Millis,
    ) {
        match self {
            AnyApp::Alarm(app) => app.poll(board, now),
            AnyApp::Pong(app) => app.poll(board, now),
            AnyApp::Duel(app) => app.poll(board, now),
        }
    }
}

/// Owns the board and one application
///
/// Each tick runs the application logic, then the device refresh (display,
/// then expander). The order never changes.
pub struct Runner<P: PortMap, D: BusDriver, E: ExtiController, A: App> {
    board: Board<P, D, E>,
    app: A,
}

impl<P: PortMap, D: BusDriver, E: ExtiController, A: App> Runner<P, D, E, A> {
    pub fn new(board: Board<P, D, E>, app: A) -> Self {
        Self { board, app }
    }

    /// Initialize the application and push the first refresh
    pub fn init(&mut self, now: Millis) {
        self.app.init(&mut self.board, now);
        self.board.service();
    }

    /// One poll-loop iteration
    pub fn tick(&mut self, now: Millis) {
        self.app.poll(&mut self.board, now);
        self.board.service();
    }

    pub fn board(&self) -> &Board<P, D, E> {
        &self.board
    }

    pub fn board_mut(&mut self) -> &mut Board<P, D, E> {
        &mut self.board
    }

    pub fn app(&self) -> &A {
        &self.app
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use leafy_core::config::parse_config;
    use leafy_core::gpio::InterruptTable;
    use leafy_core::mocks::{MockBus, MockClock, MockExti, MockPorts};
    use leafy_core::{BoardTransfers, RefreshPolicy};
    use leafy_hal::GpioPort;

    static CLOCK: MockClock = MockClock::new();
    static INPUTS: AlarmInputs<&'static MockClock> = AlarmInputs::new(&CLOCK);

    #[test]
    fn test_from_config_selects_app() {
        let config = parse_config("[app]\nrun = \"duel\"").unwrap();
        assert_eq!(AnyApp::from_config(&config, &INPUTS).kind(), AppKind::Duel);
        assert_eq!(
            AnyApp::from_config(&BoardConfig::default(), &INPUTS).kind(),
            AppKind::Alarm
        );
    }

    #[test]
    fn test_runner_tick_services_board() {
        static T: BoardTransfers = BoardTransfers::new();
        static TABLE: InterruptTable = InterruptTable::new();
        let board = Board::new(
            MockPorts::new(),
            MockBus::instant(),
            MockExti::new(),
            &TABLE,
            &T,
            RefreshPolicy::Always,
        );
        let app: AnyApp<&'static MockClock> = AnyApp::Pong(LinearPong::new(Default::default()));
        let mut runner = Runner::new(board, app);

        runner.init(Millis(0));
        assert_eq!(runner.board().display().line_text(0), Some("Linear Pong     "));
        // Ball at the left edge, mirrored inverted onto the LED expander
        T.expander.leds().with_data(|d| assert_eq!(d, &[0xFE]));

        runner.tick(Millis(150));
        assert_eq!(runner.board().expander_port().output(), 0b10);
        T.expander.leds().with_data(|d| assert_eq!(d, &[0xFD]));
    }
}
