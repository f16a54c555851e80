use std::fs;
use std::path::PathBuf;

use anyhow::Context;
use clap::Parser;
use image::{Rgb, RgbImage};
use serde_json::json;

use rusty_malus::data::malus::predicted;
use rusty_malus::data::model::Entry;

/// Write a synthetic polariser series and its settings file.
#[derive(Parser, Debug)]
#[command(name = "generate_sample")]
struct Args {
    /// Directory the frames and `settings.json` are written to.
    #[arg(long, default_value = "sample_data")]
    out_dir: PathBuf,

    /// Rotation step between frames, in degrees.
    #[arg(long, default_value_t = 15.0)]
    step: f64,

    /// Rotation uncertainty written for every frame, in degrees.
    #[arg(long, default_value_t = 1.0)]
    rotation_err: f64,

    /// Standard deviation of the pixel noise, in 8-bit levels.
    #[arg(long, default_value_t = 4.0)]
    noise: f64,
}

const WIDTH: u32 = 160;
const HEIGHT: u32 = 120;
/// Brightness of a fully transmitted frame.
const PEAK: f64 = 220.0;
/// Stray light that reaches the sensor at any angle.
const BACKGROUND: f64 = 12.0;

/// One frame: a soft spot whose brightness follows cos², tinted so that the
/// red channel carries the intensity.
fn render_frame(rotation: f64, noise: f64, rng: &mut SimpleRng) -> RgbImage {
    let level = BACKGROUND + PEAK * predicted(rotation);
    let (cx, cy) = (WIDTH as f64 / 2.0, HEIGHT as f64 / 2.0);
    let radius = HEIGHT as f64 * 0.6;

    RgbImage::from_fn(WIDTH, HEIGHT, |x, y| {
        let d = ((x as f64 - cx).powi(2) + (y as f64 - cy).powi(2)).sqrt() / radius;
        let falloff = (1.0 - 0.3 * d * d).max(0.0);
        let v = (level * falloff + rng.gauss(0.0, noise)).clamp(0.0, 255.0);
        Rgb([v as u8, (v * 0.6) as u8, (v * 0.3) as u8])
    })
}

/// Minimal deterministic PRNG (xoshiro256**)
struct SimpleRng {
    state: [u64; 4],
}

impl SimpleRng {
    fn new(seed: u64) -> Self {
        let mut s = [0u64; 4];
        let mut x = seed;
        for slot in &mut s {
            x = x.wrapping_mul(6364136223846793005).wrapping_add(1);
            *slot = x;
        }
        SimpleRng { state: s }
    }

    fn next_u64(&mut self) -> u64 {
        let result = (self.state[1].wrapping_mul(5))
            .rotate_left(7)
            .wrapping_mul(9);
        let t = self.state[1] << 17;
        self.state[2] ^= self.state[0];
        self.state[3] ^= self.state[1];
        self.state[1] ^= self.state[2];
        self.state[0] ^= self.state[3];
        self.state[2] ^= t;
        self.state[3] = self.state[3].rotate_left(45);
        result
    }

    fn next_f64(&mut self) -> f64 {
        (self.next_u64() >> 11) as f64 / (1u64 << 53) as f64
    }

    /// Box-Muller transform for normal distribution
    fn gauss(&mut self, mean: f64, std_dev: f64) -> f64 {
        let u1 = self.next_f64().max(1e-15);
        let u2 = self.next_f64();
        let z = (-2.0 * u1.ln()).sqrt() * (2.0 * std::f64::consts::PI * u2).cos();
        mean + std_dev * z
    }
}

fn main() -> anyhow::Result<()> {
    let args = Args::parse();
    anyhow::ensure!(args.step > 0.0, "--step must be positive");

    let mut rng = SimpleRng::new(42);
    fs::create_dir_all(&args.out_dir)
        .with_context(|| format!("creating {}", args.out_dir.display()))?;

    let count = (180.0 / args.step).floor() as usize + 1;
    let mut entries = Vec::with_capacity(count);
    for i in 0..count {
        let rotation = i as f64 * args.step;
        let name = format!("frame_{i:03}.png");
        let path = args.out_dir.join(&name);
        render_frame(rotation, args.noise, &mut rng)
            .save(&path)
            .with_context(|| format!("writing {}", path.display()))?;
        entries.push(Entry::new(name, rotation, args.rotation_err));
    }

    let settings = json!({
        "entries": entries,
        "create_map": true,
        "map_values": false,
        "compare": true,
    });
    let settings_path = args.out_dir.join("settings.json");
    fs::write(&settings_path, serde_json::to_string_pretty(&settings)?)
        .with_context(|| format!("writing {}", settings_path.display()))?;

    println!(
        "Wrote {count} frames ({WIDTH}x{HEIGHT}) and {}",
        settings_path.display()
    );
    Ok(())
}
