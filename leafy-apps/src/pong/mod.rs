//! Linear Pong: a ball of light bouncing along eight expander LEDs
//!
//! ```text
//!          start           paddle            miss
//! TITLE ──────────► SERVE ────────► PLAY ──────────► SERVE ...
//!   ▲                                 │ winning point
//!   │          start                  ▼
//!   └─────────────────────────────── WIN
//! ```
//!
//! Both variants share the ball, the score and the serve/win/quit rules in
//! [`Game`]. They differ in how buttons map to paddles and who scores when
//! the ball leaves the strip.

pub mod duel;
pub mod linear;

use core::fmt;

use leafy_core::config::PongConfig;
use leafy_core::input::HoldTimer;
use leafy_core::time::Interval;
use leafy_core::{Board, BusDriver, Color, GpioExt};
use leafy_hal::{ExtiController, Millis, Pin, PinMode, PortId, PortMap};

/// Leftmost LED
pub const LEFT_EDGE: i8 = 0;
/// Rightmost LED
pub const RIGHT_EDGE: i8 = 7;

/// Ball LEDs occupy expander port bits 0-7, buttons bits 8-15
const LED_BITS: u8 = 8;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum PongState {
    /// Attract mode, ball bounces until start
    Title,
    /// Ball parked at the server's edge
    Serve,
    Play,
    /// Match over, LEDs flashing
    Win,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Player {
    One,
    Two,
}

impl Player {
    pub fn other(self) -> Player {
        match self {
            Player::One => Player::Two,
            Player::Two => Player::One,
        }
    }

    /// Edge the player serves from
    pub fn home(self) -> i8 {
        match self {
            Player::One => LEFT_EDGE,
            Player::Two => RIGHT_EDGE,
        }
    }

    /// Direction the ball travels away from this player
    pub fn outward(self) -> Heading {
        match self {
            Player::One => Heading::Right,
            Player::Two => Heading::Left,
        }
    }

    pub fn color(self) -> Color {
        match self {
            Player::One => Color::CYAN,
            Player::Two => Color::YELLOW,
        }
    }

    /// First server, from the low bit of the clock
    pub fn coin_toss(now: Millis) -> Player {
        if now.as_u32() % 2 == 1 {
            Player::One
        } else {
            Player::Two
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Score {
    pub p1: u8,
    pub p2: u8,
}

impl Score {
    pub fn award(&mut self, player: Player) {
        match player {
            Player::One => self.p1 = self.p1.saturating_add(1),
            Player::Two => self.p2 = self.p2.saturating_add(1),
        }
    }

    pub fn total(&self) -> u16 {
        u16::from(self.p1) + u16::from(self.p2)
    }

    /// Winner once someone has `win_score` points and a `margin` lead
    pub fn winner(&self, win_score: u8, margin: u8) -> Option<Player> {
        if self.p1.max(self.p2) < win_score || self.p1.abs_diff(self.p2) < margin {
            return None;
        }
        if self.p1 > self.p2 {
            Some(Player::One)
        } else {
            Some(Player::Two)
        }
    }

    /// Player 1 in the high nibble, player 2 in the low nibble
    pub fn leds(&self) -> u8 {
        ((self.p1 & 0x0F) << 4) | (self.p2 & 0x0F)
    }
}

impl fmt::Display for Score {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:02} - {:02}", self.p1, self.p2)
    }
}

/// Server for the next point
///
/// The serve changes hands whenever the total score is even.
pub fn next_server(server: Player, score: &Score) -> Player {
    if score.total() % 2 == 0 {
        server.other()
    } else {
        server
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Heading {
    Left,
    Right,
}

/// Ball position on the LED strip
///
/// The position leaves `LEFT_EDGE..=RIGHT_EDGE` when a player misses.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Ball {
    position: i8,
    heading: Heading,
    step: Interval,
}

impl Ball {
    pub fn new(period_ms: u32, now: Millis) -> Self {
        Self {
            position: LEFT_EDGE,
            heading: Heading::Right,
            step: Interval::new(period_ms, now),
        }
    }

    pub fn position(&self) -> i8 {
        self.position
    }

    pub fn heading(&self) -> Heading {
        self.heading
    }

    pub fn set_heading(&mut self, heading: Heading) {
        self.heading = heading;
    }

    pub fn period(&self) -> u32 {
        self.step.period()
    }

    pub fn set_period(&mut self, period_ms: u32) {
        self.step.set_period(period_ms);
    }

    /// Park the ball and restart its step timer
    pub fn place(&mut self, position: i8, now: Millis) {
        self.position = position;
        self.step.reset(now);
    }

    /// Take the first step of a serve
    pub fn launch(&mut self, now: Millis) {
        self.advance();
        self.step.reset(now);
    }

    /// Check if a step period has elapsed
    pub fn step_due(&mut self, now: Millis) -> bool {
        self.step.poll(now)
    }

    /// Move one LED along the heading
    pub fn advance(&mut self) {
        self.position += match self.heading {
            Heading::Right => 1,
            Heading::Left => -1,
        };
    }

    /// Turn around at either edge (attract mode)
    pub fn bounce(&mut self) {
        if self.position >= RIGHT_EDGE {
            self.heading = Heading::Left;
        } else if self.position <= LEFT_EDGE {
            self.heading = Heading::Right;
        }
    }

    pub fn in_zone(&self, from: i8, to: i8) -> bool {
        (from..=to).contains(&self.position)
    }

    /// Side the ball left the strip on
    pub fn out(&self) -> Option<Heading> {
        if self.position < LEFT_EDGE {
            Some(Heading::Left)
        } else if self.position > RIGHT_EDGE {
            Some(Heading::Right)
        } else {
            None
        }
    }

    /// LED pattern of the ball, dark once out
    pub fn leds(&self) -> u8 {
        if self.out().is_some() {
            0
        } else {
            1 << self.position
        }
    }
}

/// Start-button hold that sends a match back to the title screen
///
/// Fires once per hold; the button must be released before it can fire
/// again.
#[derive(Debug, Clone, Copy)]
struct QuitHold {
    timer: HoldTimer,
    armed: bool,
    hold_ms: u32,
}

impl QuitHold {
    fn new(hold_ms: u32) -> Self {
        Self {
            timer: HoldTimer::new(),
            armed: true,
            hold_ms,
        }
    }

    fn update(&mut self, pressed: bool, now: Millis) -> bool {
        if !pressed {
            self.armed = true;
            self.timer.reset();
            return false;
        }
        if !self.armed {
            return false;
        }
        match self.timer.update(true, now) {
            Some(held) if held >= self.hold_ms => {
                self.armed = false;
                self.timer.reset();
                true
            }
            _ => false,
        }
    }
}

/// Win-screen LED flasher
#[derive(Debug, Clone, Copy)]
struct Flasher {
    interval: Interval,
    lit: bool,
}

impl Flasher {
    fn new(period_ms: u32) -> Self {
        Self {
            interval: Interval::new(period_ms, Millis::ZERO),
            lit: false,
        }
    }

    fn restart(&mut self, now: Millis) {
        self.interval.reset(now);
        self.lit = false;
    }

    fn poll(&mut self, now: Millis) -> Option<u8> {
        if !self.interval.poll(now) {
            return None;
        }
        self.lit = !self.lit;
        Some(if self.lit { 0xFF } else { 0x00 })
    }
}

/// Match state shared by both variants
pub struct Game {
    config: PongConfig,
    title: &'static str,
    state: PongState,
    ball: Ball,
    score: Score,
    server: Player,
    flash: Flasher,
    quit: QuitHold,
}

impl Game {
    pub fn new(config: PongConfig, title: &'static str) -> Self {
        Self {
            config,
            title,
            state: PongState::Title,
            ball: Ball::new(config.speeds_ms[0], Millis::ZERO),
            score: Score::default(),
            server: Player::One,
            flash: Flasher::new(config.flash_ms),
            quit: QuitHold::new(config.quit_hold_ms),
        }
    }

    pub fn config(&self) -> &PongConfig {
        &self.config
    }

    pub fn state(&self) -> PongState {
        self.state
    }

    pub fn ball(&self) -> &Ball {
        &self.ball
    }

    pub fn ball_mut(&mut self) -> &mut Ball {
        &mut self.ball
    }

    pub fn score(&self) -> Score {
        self.score
    }

    pub fn server(&self) -> Player {
        self.server
    }

    /// LEDs out, buttons in, display on, title screen
    pub fn init<P: PortMap, D: BusDriver, E: ExtiController>(
        &mut self,
        board: &mut Board<P, D, E>,
        now: Millis,
    ) {
        for bit in 0..16 {
            let mode = if bit < LED_BITS {
                PinMode::Output
            } else {
                PinMode::Input
            };
            board.configure(Pin::new(PortId::X, bit), mode);
        }
        // The bus is idle at boot; a refused init is retried by the display
        let _ = board.enable_display();
        self.show_title(board, now);
    }

    /// Attract mode: clear the match and bounce the ball
    pub fn show_title<P: PortMap, D: BusDriver, E: ExtiController>(
        &mut self,
        board: &mut Board<P, D, E>,
        now: Millis,
    ) {
        self.state = PongState::Title;
        self.score = Score::default();
        self.ball.place(LEFT_EDGE, now);
        self.ball.set_heading(Heading::Right);
        board.set_color(Color::WHITE);
        board.set_line_text(0, self.title);
        board.set_line_text(1, "Press Start");
        show(board, self.ball.leds());
    }

    /// Back to the title screen once start has been held long enough
    pub fn poll_quit<P: PortMap, D: BusDriver, E: ExtiController>(
        &mut self,
        board: &mut Board<P, D, E>,
        start_held: bool,
        now: Millis,
    ) -> bool {
        if self.quit.update(start_held, now) && self.state != PongState::Title {
            self.show_title(board, now);
            return true;
        }
        false
    }

    /// One attract-mode tick
    pub fn attract<P: PortMap, D: BusDriver, E: ExtiController>(
        &mut self,
        board: &mut Board<P, D, E>,
        now: Millis,
    ) {
        if self.ball.step_due(now) {
            self.ball.bounce();
            self.ball.advance();
            show(board, self.ball.leds());
        }
    }

    /// Start a match with a coin-toss server
    pub fn begin<P: PortMap, D: BusDriver, E: ExtiController>(
        &mut self,
        board: &mut Board<P, D, E>,
        now: Millis,
    ) {
        self.score = Score::default();
        self.server = Player::coin_toss(now);
        self.park(now);
        board.set_color(self.server.color());
        board.set_line_text(
            0,
            match self.server {
                Player::One => "1P SERVES",
                Player::Two => "2P SERVES",
            },
        );
        board.set_line_text(1, "Press Paddle");
        show(board, self.ball.leds());
    }

    fn park(&mut self, now: Millis) {
        self.state = PongState::Serve;
        self.ball.place(self.server.home(), now);
        self.ball.set_heading(self.server.outward());
    }

    /// Serve the parked ball
    pub fn launch<P: PortMap, D: BusDriver, E: ExtiController>(
        &mut self,
        board: &mut Board<P, D, E>,
        now: Millis,
    ) {
        self.state = PongState::Play;
        self.ball.launch(now);
        board.set_color(Color::WHITE);
        board.set_line_text(0, "PLAY!");
        board.set_line_text(1, "");
        show(board, self.ball.leds());
    }

    /// Put the score on the display
    pub fn show_score<P: PortMap, D: BusDriver, E: ExtiController>(
        &self,
        board: &mut Board<P, D, E>,
    ) {
        board.set_color(Color::RED);
        board.set_line_text(0, "Score");
        board.print(1, format_args!("{}", self.score));
    }

    /// Send the ball back toward the other side
    pub fn hit<P: PortMap, D: BusDriver, E: ExtiController>(
        &mut self,
        board: &mut Board<P, D, E>,
        player: Player,
    ) {
        self.ball.set_heading(player.outward());
        board.set_color(player.color());
    }

    /// One rally tick: step the ball, returning the side it left on
    pub fn rally<P: PortMap, D: BusDriver, E: ExtiController>(
        &mut self,
        board: &mut Board<P, D, E>,
        now: Millis,
    ) -> Option<Heading> {
        if !self.ball.step_due(now) {
            return None;
        }
        self.ball.advance();
        show(board, self.ball.leds());
        self.ball.out()
    }

    /// Score a point, then park for the next serve or end the match
    pub fn point<P: PortMap, D: BusDriver, E: ExtiController>(
        &mut self,
        board: &mut Board<P, D, E>,
        scorer: Player,
        now: Millis,
    ) {
        self.score.award(scorer);
        if let Some(winner) = self.score.winner(self.config.win_score, self.config.win_margin) {
            self.state = PongState::Win;
            self.flash.restart(now);
            board.set_color(winner.color());
            board.set_line_text(
                0,
                match winner {
                    Player::One => "PLAYER 1 WINS!",
                    Player::Two => "PLAYER 2 WINS!",
                },
            );
            board.print(1, format_args!("{}", self.score));
            show(board, 0);
            return;
        }

        self.server = next_server(self.server, &self.score);
        self.park(now);
        board.set_color(scorer.color());
        board.set_line_text(
            0,
            match scorer {
                Player::One => "1P SCORES!",
                Player::Two => "2P SCORES!",
            },
        );
        board.print(1, format_args!("{}", self.score));
        show(board, self.ball.leds());
    }

    /// One win-screen tick
    pub fn celebrate<P: PortMap, D: BusDriver, E: ExtiController>(
        &mut self,
        board: &mut Board<P, D, E>,
        now: Millis,
    ) {
        if let Some(leds) = self.flash.poll(now) {
            show(board, leds);
        }
    }
}

/// Put an LED pattern on the strip
pub(crate) fn show<M: PortMap>(board: &mut M, leds: u8) {
    board.write_port(PortId::X, u16::from(leds));
}

/// Sample the expander buttons
pub(crate) fn buttons<M: PortMap>(board: &mut M) -> u16 {
    board.read_port(PortId::X)
}
