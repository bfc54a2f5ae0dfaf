use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

use anyhow::{Context, Result};
use clap::Parser;

use cwnd_plot::config::TraceNaming;
use cwnd_plot::data::model::{Sample, Series};

/// Write synthetic CUBIC and NewReno cwnd traces in the simulator's format.
#[derive(Parser, Debug)]
#[command(name = "generate_sample")]
struct Args {
    /// Output prefix, as the simulation's `prefix_name`
    #[arg(long, default_value = cwnd_plot::config::DEFAULT_PREFIX)]
    prefix: String,

    /// Simulated duration in seconds
    #[arg(long, default_value_t = 20.0)]
    duration: f64,

    /// Round-trip time in seconds; cwnd is updated once per RTT
    #[arg(long, default_value_t = 0.1)]
    rtt: f64,

    /// PRNG seed
    #[arg(long, default_value_t = 42)]
    seed: u64,
}

const MSS: f64 = 1448.0;
const INITIAL_SEGMENTS: f64 = 10.0;
/// Bottleneck queue overflows above this many segments in flight.
const PIPE_SEGMENTS: f64 = 120.0;
/// Chance of a random loss in any given RTT.
const RANDOM_LOSS: f64 = 0.015;

const CUBIC_C: f64 = 0.4;
const CUBIC_BETA: f64 = 0.7;

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

    fn lost(&mut self, cwnd: f64) -> bool {
        cwnd > PIPE_SEGMENTS || self.next_f64() < RANDOM_LOSS
    }
}

/// Congestion-window growth per RTT, in segments.
trait Controller {
    fn on_rtt(&mut self, cwnd: f64, now: f64) -> f64;
    fn on_loss(&mut self, cwnd: f64, now: f64) -> f64;
}

struct NewReno {
    ssthresh: f64,
}

impl Controller for NewReno {
    fn on_rtt(&mut self, cwnd: f64, _now: f64) -> f64 {
        if cwnd < self.ssthresh {
            cwnd * 2.0
        } else {
            cwnd + 1.0
        }
    }

    fn on_loss(&mut self, cwnd: f64, _now: f64) -> f64 {
        self.ssthresh = (cwnd / 2.0).max(2.0);
        self.ssthresh
    }
}

struct Cubic {
    ssthresh: f64,
    w_max: f64,
    epoch: f64,
    k: f64,
}

impl Controller for Cubic {
    fn on_rtt(&mut self, cwnd: f64, now: f64) -> f64 {
        if cwnd < self.ssthresh {
            return cwnd * 2.0;
        }
        let t = now - self.epoch;
        let target = CUBIC_C * (t - self.k).powi(3) + self.w_max;
        target.max(cwnd + 0.1)
    }

    fn on_loss(&mut self, cwnd: f64, now: f64) -> f64 {
        self.w_max = cwnd;
        self.epoch = now;
        self.k = (self.w_max * (1.0 - CUBIC_BETA) / CUBIC_C).cbrt();
        self.ssthresh = (cwnd * CUBIC_BETA).max(2.0);
        self.ssthresh
    }
}

fn simulate(controller: &mut dyn Controller, args: &Args, rng: &mut SimpleRng) -> Series {
    let mut cwnd = INITIAL_SEGMENTS;
    let mut samples = vec![Sample::new(0.0, (cwnd * MSS) as u64)];

    let steps = (args.duration / args.rtt).ceil() as u64;
    for step in 1..=steps {
        let now = step as f64 * args.rtt;
        cwnd = if rng.lost(cwnd) {
            controller.on_loss(cwnd, now)
        } else {
            controller.on_rtt(cwnd, now)
        };
        samples.push(Sample::new(now, (cwnd * MSS) as u64));
    }
    Series::new(samples)
}

fn write_trace(path: &Path, series: &Series) -> Result<()> {
    let file = File::create(path).with_context(|| format!("creating {}", path.display()))?;
    let mut out = BufWriter::new(file);
    for sample in series.samples() {
        writeln!(out, "{sample}")?;
    }
    out.flush()?;
    Ok(())
}

fn main() -> Result<()> {
    let args = Args::parse();
    anyhow::ensure!(args.rtt > 0.0 && args.duration > 0.0, "rtt and duration must be positive");

    let naming = TraceNaming {
        prefix: args.prefix.clone(),
        ..TraceNaming::default()
    };
    let mut rng = SimpleRng::new(args.seed);

    let mut cubic = Cubic {
        ssthresh: f64::INFINITY,
        w_max: 0.0,
        epoch: 0.0,
        k: 0.0,
    };
    let mut newreno = NewReno {
        ssthresh: f64::INFINITY,
    };

    for (protocol, controller) in [
        ("TcpCubic", &mut cubic as &mut dyn Controller),
        ("TcpNewReno", &mut newreno as &mut dyn Controller),
    ] {
        let series = simulate(controller, &args, &mut rng);
        let path = naming.file_name(protocol);
        write_trace(&path, &series)?;
        println!("Wrote {} samples to {}", series.len(), path.display());
    }
    Ok(())
}
