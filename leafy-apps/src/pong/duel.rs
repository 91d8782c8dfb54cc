//! Two-button Linear Pong
//!
//! One button per player (player 1 on expander bit 8, player 2 on bit 15)
//! and start on bit 11. Paddles are edge-triggered: only a fresh press
//! while the ball is on the player's last two LEDs returns it, and every
//! return speeds the ball up one step. The player who misses concedes.

use leafy_core::config::{PongConfig, PONG_SPEEDS};
use leafy_core::input::EdgeDetector;
use leafy_core::{Board, BusDriver};
use leafy_hal::{ExtiController, Millis, PortMap};

use super::{buttons, show, Game, Heading, Player, PongState, LEFT_EDGE, RIGHT_EDGE};
use crate::app::App;

/// Player 1 button
pub const P1_BUTTON: u16 = 1 << 8;
/// Start button
pub const START: u16 = 1 << 11;
/// Player 2 button
pub const P2_BUTTON: u16 = 1 << 15;

const P1_ZONE: (i8, i8) = (LEFT_EDGE, LEFT_EDGE + 1);
const P2_ZONE: (i8, i8) = (RIGHT_EDGE - 1, RIGHT_EDGE);

pub struct DuelPong {
    game: Game,
    rally: usize,
    start: EdgeDetector,
    p1: EdgeDetector,
    p2: EdgeDetector,
}

impl DuelPong {
    pub fn new(config: PongConfig) -> Self {
        Self {
            game: Game::new(config, "Pong Duel"),
            rally: 0,
            start: EdgeDetector::new(),
            p1: EdgeDetector::new(),
            p2: EdgeDetector::new(),
        }
    }

    pub fn game(&self) -> &Game {
        &self.game
    }

    /// Current speed step (0 = slowest)
    pub fn speed(&self) -> usize {
        self.rally
    }

    fn set_speed(&mut self, step: usize) {
        self.rally = step.min(PONG_SPEEDS - 1);
        let period = self.game.config().speeds_ms[self.rally];
        self.game.ball_mut().set_period(period);
    }

    fn play<P: PortMap, D: BusDriver, E: ExtiController>(
        &mut self,
        board: &mut Board<P, D, E>,
        p1: bool,
        p2: bool,
        now: Millis,
    ) {
        let ball = *self.game.ball();
        let returned = if p1
            && ball.heading() == Heading::Left
            && ball.in_zone(P1_ZONE.0, P1_ZONE.1)
        {
            Some(Player::One)
        } else if p2 && ball.heading() == Heading::Right && ball.in_zone(P2_ZONE.0, P2_ZONE.1) {
            Some(Player::Two)
        } else {
            None
        };
        if let Some(player) = returned {
            self.game.hit(board, player);
            self.set_speed(self.rally + 1);
        }

        // The player on the side the ball left missed it
        match self.game.rally(board, now) {
            Some(Heading::Left) => self.game.point(board, Player::Two, now),
            Some(Heading::Right) => self.game.point(board, Player::One, now),
            None => {}
        }
    }
}

impl App for DuelPong {
    fn init<P: PortMap, D: BusDriver, E: ExtiController>(
        &mut self,
        board: &mut Board<P, D, E>,
        now: Millis,
    ) {
        self.set_speed(0);
        self.start = EdgeDetector::new();
        self.p1 = EdgeDetector::new();
        self.p2 = EdgeDetector::new();
        self.game.init(board, now);
    }

    fn poll<P: PortMap, D: BusDriver, E: ExtiController>(
        &mut self,
        board: &mut Board<P, D, E>,
        now: Millis,
    ) {
        let input = buttons(board);
        let start_held = input & START != 0;
        let start = self.start.update(start_held);
        let p1 = self.p1.update(input & P1_BUTTON != 0);
        let p2 = self.p2.update(input & P2_BUTTON != 0);

        if self.game.poll_quit(board, start_held, now) {
            self.set_speed(0);
            return;
        }

        match self.game.state() {
            PongState::Title => {
                if start {
                    self.game.begin(board, now);
                    return;
                }
                self.game.attract(board, now);
            }
            PongState::Serve => {
                let pressed = match self.game.server() {
                    Player::One => p1,
                    Player::Two => p2,
                };
                if pressed {
                    self.set_speed(0);
                    self.game.launch(board, now);
                    return;
                }
                show(board, self.game.ball().leds());
            }
            PongState::Play => self.play(board, p1, p2, now),
            PongState::Win => {
                if start {
                    self.game.show_title(board, now);
                    return;
                }
                self.game.celebrate(board, now);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pong::tests::mock_board;
    use crate::pong::Score;
    use leafy_core::gpio::InterruptTable;
    use leafy_core::mocks::MockBoard;
    use leafy_core::{BoardTransfers, Color};

    struct Rig {
        board: MockBoard,
        pong: DuelPong,
    }

    impl Rig {
        fn new(table: &'static InterruptTable, transfers: &'static BoardTransfers) -> Self {
            let mut board = mock_board(table, transfers);
            let mut pong = DuelPong::new(PongConfig::default());
            pong.init(&mut board, Millis(0));
            board.service();
            Self { board, pong }
        }

        fn tick(&mut self, at: u32, held: u16) {
            self.board.expander_port_mut().set_input(held);
            self.pong.poll(&mut self.board, Millis(at));
            self.board.service();
        }

        fn run(&mut self, from: u32, to: u32) {
            for at in from..=to {
                self.tick(at, 0);
            }
        }

        /// Start a match served by player 1 and serve it at `at`
        fn serve_p1(&mut self, at: u32) {
            self.tick(1, START);
            self.tick(2, 0);
            self.tick(at, P1_BUTTON);
        }

        fn state(&self) -> PongState {
            self.pong.game().state()
        }

        fn position(&self) -> i8 {
            self.pong.game().ball().position()
        }

        fn heading(&self) -> Heading {
            self.pong.game().ball().heading()
        }
    }

    macro_rules! rig {
        () => {{
            static TABLE: InterruptTable = InterruptTable::new();
            static T: BoardTransfers = BoardTransfers::new();
            Rig::new(&TABLE, &T)
        }};
    }

    #[test]
    fn test_title() {
        let rig = rig!();
        assert_eq!(rig.state(), PongState::Title);
        assert_eq!(rig.board.display().line_text(0), Some("Pong Duel       "));
    }

    #[test]
    fn test_return_speeds_up() {
        let mut rig = rig!();
        rig.serve_p1(10);
        assert_eq!(rig.state(), PongState::Play);
        assert_eq!(rig.position(), 1);

        // 150 ms steps: 2@160 .. 6@760
        rig.run(11, 760);
        assert_eq!(rig.position(), 6);

        rig.tick(761, P2_BUTTON);
        assert_eq!(rig.heading(), Heading::Left);
        assert_eq!(rig.pong.speed(), 1);
        assert_eq!(rig.pong.game().ball().period(), 110);
        assert_eq!(rig.board.display().color(), Color::YELLOW);

        rig.run(762, 870);
        assert_eq!(rig.position(), 5);
    }

    #[test]
    fn test_held_button_does_not_return() {
        let mut rig = rig!();
        rig.serve_p1(10);
        rig.run(11, 460);
        assert_eq!(rig.position(), 4);

        // Pressed early and held into the zone: no fresh edge
        for at in 461..=760 {
            rig.tick(at, P2_BUTTON);
        }
        assert_eq!(rig.position(), 6);
        assert_eq!(rig.heading(), Heading::Right);
    }

    #[test]
    fn test_miss_concedes() {
        let mut rig = rig!();
        rig.serve_p1(10);
        rig.run(11, 1060);
        assert_eq!(rig.state(), PongState::Serve);
        // Player 2 missed on the right
        assert_eq!(rig.pong.game().score(), Score { p1: 1, p2: 0 });
        assert_eq!(rig.pong.game().server(), Player::One);
        assert_eq!(rig.position(), LEFT_EDGE);
    }

    #[test]
    fn test_serve_resets_speed() {
        let mut rig = rig!();
        rig.serve_p1(10);
        rig.run(11, 760);
        rig.tick(761, P2_BUTTON);
        assert_eq!(rig.pong.speed(), 1);

        // Player 1 misses: 110 ms steps, off the left edge at 1530
        rig.run(762, 1530);
        assert_eq!(rig.pong.game().score(), Score { p1: 0, p2: 1 });
        assert_eq!(rig.state(), PongState::Serve);

        rig.tick(1600, P1_BUTTON);
        assert_eq!(rig.pong.speed(), 0);
        assert_eq!(rig.pong.game().ball().period(), 150);
    }

    #[test]
    fn test_speed_clamps() {
        let mut rig = rig!();
        rig.pong.set_speed(5);
        assert_eq!(rig.pong.speed(), PONG_SPEEDS - 1);
        assert_eq!(rig.pong.game().ball().period(), 70);
    }
}
