//! Offline renderer for the factory flavors.
//!
//! Reads a stereo WAV (16 or 24 bit integer), or synthesizes a demo program
//! when no input is given, runs every factory flavor through the full chain in
//! 128-frame blocks, and writes one 16-bit WAV per flavor into the output
//! directory (second argument, defaults to the working directory). Prints
//! per-flavor telemetry so renders can be compared at a glance.

use std::path::PathBuf;

use anyhow::{Context, Result};
use horizon::{factory_preset, factory_preset_names, gr_to_leds, HostProcessor};
use hound::{SampleFormat, WavReader, WavSpec, WavWriter};

const BLOCK_FRAMES: usize = 128;
const DEMO_SECONDS: f32 = 4.0;
const DEMO_RATE: u32 = 44100;

struct Program {
    rate: u32,
    left: Vec<f32>,
    right: Vec<f32>,
}

fn load_wav(path: &PathBuf) -> Result<Program> {
    let reader = WavReader::open(path)
        .with_context(|| format!("failed to open input WAV '{}'", path.display()))?;
    let spec = reader.spec();
    if spec.sample_format != SampleFormat::Int {
        anyhow::bail!("only integer WAV input is supported");
    }
    let scale = match spec.bits_per_sample {
        16 => (i16::MAX as f32).recip(),
        24 => 8388607.0f32.recip(),
        bits => anyhow::bail!("unsupported bit depth: {}", bits),
    };

    let mut left = Vec::new();
    let mut right = Vec::new();
    let mut it = reader.into_samples::<i32>();
    while let Some(l) = it.next() {
        let l = l? as f32 * scale;
        let r = if spec.channels > 1 {
            it.next().transpose()?.map(|s| s as f32 * scale).unwrap_or(l)
        } else {
            l
        };
        left.push(l);
        right.push(r);
    }
    Ok(Program {
        rate: spec.sample_rate,
        left,
        right,
    })
}

/// Demo program: a 200 Hz tone in the mid with a slow 3 Hz side wobble, plus
/// a click every half second so the transient path has something to chew on.
fn synthesize_demo() -> Program {
    let frames = (DEMO_SECONDS * DEMO_RATE as f32) as usize;
    let mut left = Vec::with_capacity(frames);
    let mut right = Vec::with_capacity(frames);
    for i in 0..frames {
        let t = i as f32 / DEMO_RATE as f32;
        let mid = 0.5 * (std::f32::consts::TAU * 200.0 * t).sin();
        let side = 0.2 * (std::f32::consts::TAU * 3.0 * t).sin();
        let click = if i % (DEMO_RATE as usize / 2) < 32 { 0.4 } else { 0.0 };
        left.push((mid + side + click).clamp(-1.0, 1.0));
        right.push((mid - side + click).clamp(-1.0, 1.0));
    }
    Program {
        rate: DEMO_RATE,
        left,
        right,
    }
}

fn write_wav(path: &PathBuf, rate: u32, left: &[f32], right: &[f32]) -> Result<()> {
    let spec = WavSpec {
        channels: 2,
        sample_rate: rate,
        bits_per_sample: 16,
        sample_format: SampleFormat::Int,
    };
    let mut writer = WavWriter::create(path, spec)
        .with_context(|| format!("failed to create '{}'", path.display()))?;
    for (l, r) in left.iter().zip(right.iter()) {
        writer.write_sample((l.clamp(-1.0, 1.0) * i16::MAX as f32) as i16)?;
        writer.write_sample((r.clamp(-1.0, 1.0) * i16::MAX as f32) as i16)?;
    }
    writer.finalize()?;
    Ok(())
}

fn main() -> Result<()> {
    env_logger::init();
    #[cfg(feature = "debug")]
    horizon::debug::logger::init();

    let mut args = std::env::args().skip(1);
    let input = args.next().map(PathBuf::from);
    let out_dir = args.next().map(PathBuf::from).unwrap_or_else(|| PathBuf::from("."));
    std::fs::create_dir_all(&out_dir)
        .with_context(|| format!("failed to create output dir '{}'", out_dir.display()))?;
    let (program, stem) = match &input {
        Some(path) => (
            load_wav(path)?,
            path.file_stem()
                .map(|s| s.to_string_lossy().into_owned())
                .unwrap_or_else(|| "render".to_string()),
        ),
        None => (synthesize_demo(), "demo".to_string()),
    };
    println!(
        "program: {} frames at {} Hz",
        program.left.len(),
        program.rate
    );

    for name in factory_preset_names() {
        let params = factory_preset(name)
            .with_context(|| format!("factory flavor '{}' missing", name))?;

        let mut proc = HostProcessor::new(program.rate as f64, BLOCK_FRAMES);
        params.apply_to(&mut proc);
        proc.prepare_to_play(program.rate as f64, BLOCK_FRAMES);
        let meters = proc.meters();

        let mut out_l = program.left.clone();
        let mut out_r = program.right.clone();
        let mut worst_gr = 0.0f32;
        for (cl, cr) in out_l
            .chunks_mut(BLOCK_FRAMES)
            .zip(out_r.chunks_mut(BLOCK_FRAMES))
        {
            proc.process_block_in_place(cl, cr, program.rate as f64);
            worst_gr = worst_gr.min(proc.limiter_telemetry().gain_reduction_db);
        }

        let out_path = out_dir.join(format!("{}_{}.wav", stem, name));
        write_wav(&out_path, program.rate, &out_l, &out_r)?;

        let t = proc.limiter_telemetry();
        println!(
            "{:<20} -> {:<28} peak_in {:.3} peak_out {:.3} gr {:+.2} dB ({} LEDs) width {:.2} clip {}",
            name,
            out_path.display(),
            t.peak_in,
            meters.get_output_peak(),
            worst_gr,
            gr_to_leds(worst_gr),
            meters.get_width_now(),
            meters.take_clip()
        );
    }

    #[cfg(feature = "debug")]
    horizon::debug::logger::drain_to_file();
    Ok(())
}
