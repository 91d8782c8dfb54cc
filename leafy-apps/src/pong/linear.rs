//! Linear Pong with three paddle buttons per player
//!
//! Expander inputs: player 1 paddles on bits 8-10, start on 11, select on
//! 12, player 2 paddles on 13-15. Paddles are level-triggered: holding any
//! of a player's buttons while the ball is in their hit zone returns it.
//!
//! A ball leaving the left edge scores for player 1 and one leaving the
//! right edge scores for player 2.

use leafy_core::config::{PongConfig, PONG_SPEEDS};
use leafy_core::input::EdgeDetector;
use leafy_core::{Board, BusDriver};
use leafy_hal::{ExtiController, Millis, PortMap};

use super::{buttons, show, Game, Heading, Player, PongState};
use crate::app::App;

/// Player 1 paddle buttons
pub const P1_PADDLES: u16 = 0x0700;
/// Start button
pub const START: u16 = 1 << 11;
/// Speed/score select button
pub const SELECT: u16 = 1 << 12;
/// Player 2 paddle buttons
pub const P2_PADDLES: u16 = 0xE000;

const P1_ZONE: (i8, i8) = (1, 2);
const P2_ZONE: (i8, i8) = (5, 6);

const SPEED_NAMES: [&str; PONG_SPEEDS] = ["SLOW", "MED", "FAST"];

pub struct LinearPong {
    game: Game,
    speed: usize,
    start: EdgeDetector,
    select: EdgeDetector,
}

impl LinearPong {
    pub fn new(config: PongConfig) -> Self {
        Self {
            game: Game::new(config, "Linear Pong"),
            speed: 0,
            start: EdgeDetector::new(),
            select: EdgeDetector::new(),
        }
    }

    pub fn game(&self) -> &Game {
        &self.game
    }

    /// Selected speed index (0 = slow)
    pub fn speed(&self) -> usize {
        self.speed
    }

    fn set_speed(&mut self, speed: usize) {
        self.speed = speed % PONG_SPEEDS;
        let period = self.game.config().speeds_ms[self.speed];
        self.game.ball_mut().set_period(period);
    }

    fn play<P: PortMap, D: BusDriver, E: ExtiController>(
        &mut self,
        board: &mut Board<P, D, E>,
        input: u16,
        now: Millis,
    ) {
        let ball = *self.game.ball();
        if input & P1_PADDLES != 0
            && ball.heading() == Heading::Left
            && ball.in_zone(P1_ZONE.0, P1_ZONE.1)
        {
            self.game.hit(board, Player::One);
        } else if input & P2_PADDLES != 0
            && ball.heading() == Heading::Right
            && ball.in_zone(P2_ZONE.0, P2_ZONE.1)
        {
            self.game.hit(board, Player::Two);
        }

        match self.game.rally(board, now) {
            Some(Heading::Left) => self.game.point(board, Player::One, now),
            Some(Heading::Right) => self.game.point(board, Player::Two, now),
            None => {}
        }
    }
}

impl App for LinearPong {
    fn init<P: PortMap, D: BusDriver, E: ExtiController>(
        &mut self,
        board: &mut Board<P, D, E>,
        now: Millis,
    ) {
        self.set_speed(0);
        self.start = EdgeDetector::new();
        self.select = EdgeDetector::new();
        self.game.init(board, now);
    }

    fn poll<P: PortMap, D: BusDriver, E: ExtiController>(
        &mut self,
        board: &mut Board<P, D, E>,
        now: Millis,
    ) {
        let input = buttons(board);
        let start_held = input & START != 0;
        let select_held = input & SELECT != 0;
        let start = self.start.update(start_held);
        let select = self.select.update(select_held);

        if self.game.poll_quit(board, start_held, now) {
            self.set_speed(0);
            return;
        }

        match self.game.state() {
            PongState::Title => {
                if select {
                    self.set_speed(self.speed + 1);
                    board.print(1, format_args!("Speed: {}", SPEED_NAMES[self.speed]));
                }
                if start {
                    self.game.begin(board, now);
                    return;
                }
                self.game.attract(board, now);
            }
            PongState::Serve => {
                if select {
                    self.game.show_score(board);
                }
                let paddles = match self.game.server() {
                    Player::One => P1_PADDLES,
                    Player::Two => P2_PADDLES,
                };
                if input & paddles != 0 {
                    self.game.launch(board, now);
                    return;
                }
                let leds = if select_held {
                    self.game.score().leds()
                } else {
                    self.game.ball().leds()
                };
                show(board, leds);
            }
            PongState::Play => self.play(board, input, now),
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
