use anyhow::{Context, Result};
use hound::{SampleFormat, WavReader, WavSpec, WavWriter};
use simple_eq::dsp::StereoProcessor;
use simple_eq::ChainSettings;
use std::path::PathBuf;

const BLOCK_SIZE: usize = 512;

fn usage() -> anyhow::Error {
    anyhow::anyhow!("usage: eq_render <input.wav> <output.wav> [settings.json]")
}

fn load_settings(path: Option<PathBuf>) -> Result<ChainSettings> {
    let Some(path) = path else {
        return Ok(ChainSettings::default());
    };
    let text = std::fs::read_to_string(&path)
        .with_context(|| format!("failed to read settings '{}'", path.display()))?;
    serde_json::from_str(&text)
        .with_context(|| format!("failed to parse settings '{}'", path.display()))
}

fn read_channels(input: &PathBuf) -> Result<(WavSpec, Vec<Vec<f32>>)> {
    let reader = WavReader::open(input)
        .with_context(|| format!("failed to open input WAV '{}'", input.display()))?;
    let spec = reader.spec();
    let channels = spec.channels as usize;
    if channels == 0 || channels > 2 {
        anyhow::bail!("only mono and stereo files are supported, got {} channels", channels);
    }

    let interleaved: Vec<f32> = match spec.sample_format {
        SampleFormat::Float => reader.into_samples::<f32>().collect::<Result<_, _>>()?,
        SampleFormat::Int => {
            let scale = (1i64 << (spec.bits_per_sample - 1)) as f32;
            reader
                .into_samples::<i32>()
                .map(|s| s.map(|v| v as f32 / scale))
                .collect::<Result<_, _>>()?
        }
    };

    let mut split = vec![Vec::with_capacity(interleaved.len() / channels); channels];
    for frame in interleaved.chunks_exact(channels) {
        for (ch, &sample) in frame.iter().enumerate() {
            split[ch].push(sample);
        }
    }
    Ok((spec, split))
}

fn main() -> Result<()> {
    let mut args = std::env::args().skip(1);
    let input = args.next().map(PathBuf::from).ok_or_else(usage)?;
    let output = args.next().map(PathBuf::from).ok_or_else(usage)?;
    let settings = load_settings(args.next().map(PathBuf::from))?;

    let (spec, mut channels) = read_channels(&input)?;
    let sample_rate = spec.sample_rate as f32;

    let mut eq = StereoProcessor::new();
    eq.prepare(sample_rate, BLOCK_SIZE);

    let frames = channels.first().map(Vec::len).unwrap_or(0);
    let mut start = 0;
    while start < frames {
        let end = (start + BLOCK_SIZE).min(frames);
        eq.update_filters(&settings);
        match channels.as_mut_slice() {
            [left, right] => eq.process(&mut left[start..end], &mut right[start..end]),
            [mono] => eq.process_mono(&mut mono[start..end]),
            _ => {}
        }
        start = end;
    }

    let out_spec = WavSpec {
        channels: spec.channels,
        sample_rate: spec.sample_rate,
        bits_per_sample: 32,
        sample_format: SampleFormat::Float,
    };
    let mut writer = WavWriter::create(&output, out_spec)
        .with_context(|| format!("failed to create output WAV '{}'", output.display()))?;
    for frame in 0..frames {
        for channel in &channels {
            writer.write_sample(channel[frame])?;
        }
    }
    writer.finalize()?;

    println!("Rendered '{}' -> '{}':", input.display(), output.display());
    println!("  frames         : {}", frames);
    println!("  sample rate    : {} Hz", spec.sample_rate);
    println!(
        "  low cut        : {:.1} Hz, {} dB/oct",
        settings.low_cut_freq,
        settings.low_cut_slope.db_per_octave()
    );
    println!(
        "  peak           : {:.1} Hz, {:+.1} dB, Q {:.2}",
        settings.peak_freq, settings.peak_gain_db, settings.peak_quality
    );
    println!(
        "  high cut       : {:.1} Hz, {} dB/oct",
        settings.high_cut_freq,
        settings.high_cut_slope.db_per_octave()
    );
    Ok(())
}
