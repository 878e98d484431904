//! Blade Arcade entry point
//!
//! The browser build is driven from JavaScript through `blade_arcade::web`.
//! Natively there is no camera or tracker, so the binary plays a headless
//! round with a scripted hand and prints the result.

#[cfg(not(target_arch = "wasm32"))]
mod headless {
    use std::f32::consts::TAU;
    use std::path::PathBuf;

    use clap::Parser;

    use blade_arcade::gesture::HandLandmarks;
    use blade_arcade::perception::{PerceptionFrame, perception_slot};
    use blade_arcade::session::FinalScore;
    use blade_arcade::{
        GameMode, HighScores, MediaError, MediaSource, RoundConfig, Session, SessionPhase, Tuning,
    };

    const FRAME_MS: f64 = 1000.0 / 60.0;

    #[derive(Parser, Debug)]
    #[command(name = "blade-arcade", about = "Headless blade arcade round with a scripted hand")]
    struct Args {
        /// Game mode: timed, survival or dodge
        #[arg(long, default_value = "timed")]
        mode: GameMode,

        /// Timed mode duration (seconds)
        #[arg(long, default_value_t = 60)]
        duration: i64,

        /// RNG seed
        #[arg(long, default_value_t = 42)]
        seed: u64,

        /// Stop after this many frames even if the round is still running
        #[arg(long, default_value_t = 60 * 60 * 4)]
        frames: u64,

        /// JSON file overriding tuning values
        #[arg(long)]
        tuning: Option<PathBuf>,
    }

    /// Stand-in camera; always available, no photo
    struct NullCamera;

    impl MediaSource for NullCamera {
        fn start(&mut self) -> Result<(), MediaError> {
            Ok(())
        }

        fn stop(&mut self) {}

        fn snapshot(&mut self) -> Option<String> {
            None
        }
    }

    /// Hold still on the calibration ring, then swing back and forth
    fn scripted_hand(frame: u64, calibrated: bool) -> HandLandmarks {
        if !calibrated {
            return HandLandmarks::synthetic(0.5, 0.5, false);
        }
        let t = frame as f32 / 60.0;
        let x = 0.5 + 0.4 * (t * TAU * 0.9).sin();
        let y = 0.45 + 0.25 * (t * TAU * 0.37).sin();
        HandLandmarks::synthetic(x, y, false)
    }

    pub fn run() -> Result<(), Box<dyn std::error::Error>> {
        env_logger::init();
        let args = Args::parse();

        let tuning = match &args.tuning {
            Some(path) => Tuning::from_json(&std::fs::read_to_string(path)?)?,
            None => Tuning::default(),
        };
        let round = RoundConfig::new(args.mode, args.duration)?;
        log::info!("Blade Arcade (native) starting: {:?}", round);

        let (writer, reader) = perception_slot();
        let mut session = Session::start(round, tuning, NullCamera, reader, args.seed)?;
        let mut scores = HighScores::new();

        let mut frame = 0;
        while frame < args.frames {
            let now = frame as f64 * FRAME_MS;
            let calibrated = session.phase() != SessionPhase::Calibrating;
            writer.publish(PerceptionFrame::hand(scripted_hand(frame, calibrated), now));
            if let SessionPhase::Ended(_) = session.frame(now, &mut scores) {
                break;
            }
            frame += 1;
        }
        if !matches!(session.phase(), SessionPhase::Ended(_)) {
            log::info!("Frame limit reached, stopping");
            session.stop();
        }

        let state = session.state();
        println!("Phase:      {:?}", session.phase());
        println!("Frames:     {}", state.frame);
        match session.final_score() {
            FinalScore::Points(p) => println!("Score:      {p}"),
            FinalScore::Seconds(s) => println!("Survived:   {s:.2}s"),
        }
        println!("Multiplier: x{}", state.combo.multiplier);
        println!("Difficulty: {:.2}", state.difficulty);
        if session.round().mode.uses_lives() {
            println!("Lives:      {}", state.lives);
        }
        println!("Leaderboard: {}", scores.to_json()?);
        Ok(())
    }
}

#[cfg(not(target_arch = "wasm32"))]
fn main() -> Result<(), Box<dyn std::error::Error>> {
    headless::run()
}

#[cfg(target_arch = "wasm32")]
fn main() {
    // WASM entry point is blade_arcade::web::init, this is just to satisfy the compiler
}
