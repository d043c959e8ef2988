//! Integration test: build module bytes → decode → render → verify output.

use ms_engine::{MixMode, NullSink, Player, PlayerConfig, PlayerOption};
use ms_format::builder::{ModuleBuilder, SampleSpec};
use ms_format::{Module, ModuleFormat};
use ms_master::{samples_to_wav, Controller, RenderSettings};

const TICK: usize = 882;
const ROW: usize = 6 * TICK;

fn sine(len: usize) -> Vec<i8> {
    (0..len)
        .map(|i| ((i as f32 / len as f32 * std::f32::consts::TAU).sin() * 120.0) as i8)
        .collect()
}

/// A short two-pattern tune with a bass line and a lead.
fn tune(format: ModuleFormat) -> Vec<u8> {
    let mut builder = ModuleBuilder::new(format)
        .title("integration tune")
        .instrument(1, SampleSpec::new(sine(64), 64).looped(0, 64))
        .instrument(2, SampleSpec::new(sine(32), 40).looped(0, 32))
        .sequence(&[0, 1]);
    for row in (0..64).step_by(4) {
        builder = builder
            .note(0, row, 0, 428, 1)
            .note(0, row + 2, 1, 214, 2)
            .note(1, row, 2, 320, 1)
            .note(1, row + 2, 3, 160, 2);
    }
    builder.build()
}

fn player(data: &[u8], looping: bool) -> Player<'_, NullSink> {
    let config = PlayerConfig {
        looping,
        ..Default::default()
    };
    Player::with_sink(Module::decode(data).unwrap(), config, NullSink)
}

fn render(player: &mut Player<'_, NullSink>, frames: usize, mode: MixMode) -> (Vec<i16>, bool) {
    let mut out = vec![0; frames * mode.channels()];
    let more = player.render(&mut out, mode);
    (out, more)
}

fn max_amplitude(samples: &[i16]) -> i16 {
    samples.iter().map(|s| s.saturating_abs()).max().unwrap_or(0)
}

#[test]
fn both_layouts_render_nonsilent() {
    for format in [ModuleFormat::Classic15, ModuleFormat::ProTracker31] {
        let data = tune(format);
        let mut p = player(&data, true);
        let (out, more) = render(&mut p, 44100, MixMode::StereoSoft);
        assert!(more);
        assert!(max_amplitude(&out) > 1000, "{format:?} too quiet");
    }
}

#[test]
fn layouts_sound_the_same() {
    let classic = tune(ModuleFormat::Classic15);
    let protracker = tune(ModuleFormat::ProTracker31);
    let (a, _) = render(&mut player(&classic, true), 30_000, MixMode::Mono);
    let (b, _) = render(&mut player(&protracker, true), 30_000, MixMode::Mono);
    assert_eq!(a, b);
}

#[test]
fn hard_stereo_separates_channels() {
    let data = tune(ModuleFormat::ProTracker31);
    let mut p = player(&data, true);
    // First pattern: only channels 0 (left) and 1 (right)
    let (out, _) = render(&mut p, 4 * ROW, MixMode::StereoHard);
    let left: Vec<i16> = out.iter().step_by(2).copied().collect();
    let right: Vec<i16> = out.iter().skip(1).step_by(2).copied().collect();
    assert!(max_amplitude(&left) > 0);
    assert!(max_amplitude(&right) > 0);
    assert_ne!(left, right);
}

#[test]
fn mono_is_quieter_than_hard_stereo_side() {
    let data = tune(ModuleFormat::ProTracker31);
    let (mono, _) = render(&mut player(&data, true), 4 * ROW, MixMode::Mono);
    let (hard, _) = render(&mut player(&data, true), 4 * ROW, MixMode::StereoHard);
    assert!(max_amplitude(&mono) <= max_amplitude(&hard));
}

#[test]
fn song_plays_once_without_loop() {
    let data = tune(ModuleFormat::ProTracker31);
    let mut p = player(&data, false);
    let song_frames = (2 * 64 - 1) * ROW + TICK;

    let (_, more) = render(&mut p, song_frames - 1, MixMode::Mono);
    assert!(more);
    let (_, more) = render(&mut p, 1, MixMode::Mono);
    assert!(!more);

    let (tail, more) = render(&mut p, 1000, MixMode::Mono);
    assert!(!more);
    assert_eq!(max_amplitude(&tail), 0);
}

#[test]
fn loop_option_can_change_mid_song() {
    let data = tune(ModuleFormat::ProTracker31);
    let mut p = player(&data, true);
    render(&mut p, 64 * ROW, MixMode::Mono);
    p.set_option(PlayerOption::Loop, false);
    let (_, more) = render(&mut p, 64 * ROW, MixMode::Mono);
    assert!(!more);
}

#[test]
fn start_position_skips_first_pattern() {
    let data = tune(ModuleFormat::ProTracker31);
    let mut p = player(&data, true);
    p.set_sequence_position(1);
    render(&mut p, TICK, MixMode::Mono);

    let pos = p.position();
    assert_eq!((pos.sequence, pos.pattern, pos.row), (1, 1, 1));
    // Pattern 1 only plays channels 2 and 3
    assert!(p.channel(2).unwrap().active);
    assert!(!p.channel(0).unwrap().active);
}

#[test]
fn controller_matches_player() {
    let data = tune(ModuleFormat::ProTracker31);
    let controller = Controller::load(data.clone()).unwrap();
    let settings = RenderSettings {
        config: PlayerConfig {
            looping: false,
            ..Default::default()
        },
        mix: MixMode::StereoHard,
        start: 0,
    };
    let pcm = controller.render_with(settings, 20_000).unwrap();
    let (direct, _) = render(&mut player(&data, false), 20_000, MixMode::StereoHard);
    assert_eq!(pcm, direct);

    let wav = controller.render_to_wav(settings, 1).unwrap();
    assert_eq!(wav.len(), samples_to_wav(&vec![0; 44100 * 2], 2, 44100).len());
}

#[test]
fn controller_reports_module_details() {
    let controller = Controller::load(tune(ModuleFormat::Classic15)).unwrap();
    let module = controller.module().unwrap();
    assert_eq!(module.title().as_str(), "integration tune");
    assert_eq!(module.format(), ModuleFormat::Classic15);
    assert_eq!(module.sequence(), &[0, 1]);
    assert_eq!(module.pattern_count(), 2);
    assert_eq!(module.instruments()[0].len(), 64);
    assert_eq!(module.instruments()[1].default_volume(), 40);
}
