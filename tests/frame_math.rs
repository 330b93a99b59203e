mod common;

mod tests {
    use arm_light_animator::color::Rgb;
    use arm_light_animator::frame::{chase_index, compute_frame, cycle_position};
    use arm_light_animator::{ARM_COUNT, AnimationKind, ArmPreset, Frame, StripEffect};
    use embassy_time::Duration;

    use super::common::{BLACK, BLUE, GREEN, RED, colors_close, ms};

    const PURPLE: Rgb = Rgb { r: 128, g: 0, b: 128 };
    const DARK_PURPLE: Rgb = Rgb { r: 70, g: 20, b: 90 };
    const AQUA: Rgb = Rgb { r: 0, g: 180, b: 180 };
    const SKY_BLUE: Rgb = Rgb { r: 0, g: 50, b: 255 };
    const SUN_YELLOW: Rgb = Rgb { r: 255, g: 220, b: 0 };
    const CYCLE: Duration = Duration::from_millis(1000);

    fn arms(preset: ArmPreset, brightness: u8, elapsed_ms: u64) -> [Rgb; ARM_COUNT] {
        let elapsed = ms(elapsed_ms);
        preset.arms_at(BLACK, brightness, cycle_position(elapsed, CYCLE), elapsed, CYCLE)
    }

    #[test]
    fn test_cycle_position() {
        assert_eq!(cycle_position(ms(0), CYCLE), 0.0);
        assert_eq!(cycle_position(ms(250), CYCLE), 0.25);
        assert_eq!(cycle_position(ms(1000), CYCLE), 1.0);
        assert_eq!(cycle_position(ms(1500), CYCLE), 1.0);
        assert_eq!(cycle_position(ms(10), Duration::from_ticks(0)), 1.0);
    }

    #[test]
    fn test_solid_strip_is_constant() {
        for t in [0.0, 0.3, 0.99, 1.0] {
            assert_eq!(StripEffect::Solid.color_at(BLUE, t), BLUE);
        }
    }

    #[test]
    fn test_pulse() {
        assert_eq!(StripEffect::Pulse.color_at(RED, 0.0), BLACK);
        assert_eq!(StripEffect::Pulse.color_at(RED, 0.5), RED);
        assert_eq!(StripEffect::Pulse.color_at(RED, 1.0), BLACK);
        assert!(colors_close(
            StripEffect::Pulse.color_at(RED, 0.25),
            Rgb { r: 128, g: 0, b: 0 },
            1
        ));
    }

    #[test]
    fn test_wave() {
        assert_eq!(StripEffect::Wave.color_at(RED, 0.0), BLACK);
        assert_eq!(StripEffect::Wave.color_at(RED, 0.5), RED);
        // 0.5 ^ 1.05 of full scale
        assert!(colors_close(
            StripEffect::Wave.color_at(RED, 0.25),
            Rgb { r: 123, g: 0, b: 0 },
            1
        ));
    }

    #[test]
    fn test_strobe() {
        assert_eq!(StripEffect::Strobe.color_at(GREEN, 0.0), BLACK);
        assert_eq!(StripEffect::Strobe.color_at(GREEN, 0.2), BLACK);
        assert_eq!(StripEffect::Strobe.color_at(GREEN, 0.21), GREEN);
        assert_eq!(StripEffect::Strobe.color_at(GREEN, 1.0), GREEN);
    }

    #[test]
    fn test_mix_runs_pulse_wave_strobe() {
        // First third: pulse
        assert_eq!(StripEffect::Mix.color_at(RED, 0.0), BLACK);
        assert!(colors_close(StripEffect::Mix.color_at(RED, 1.0 / 6.0), RED, 1));
        // Second third: wave
        assert!(colors_close(StripEffect::Mix.color_at(RED, 0.5), RED, 1));
        // Last third: strobe, dark for its first fifth
        assert_eq!(StripEffect::Mix.color_at(RED, 0.7), BLACK);
        assert_eq!(StripEffect::Mix.color_at(RED, 0.9), RED);
        assert_eq!(StripEffect::Mix.color_at(RED, 1.0), BLACK);
    }

    #[test]
    fn test_strip_effects_never_exceed_base() {
        let base = Rgb { r: 200, g: 120, b: 40 };
        for effect in [StripEffect::Pulse, StripEffect::Wave, StripEffect::Mix] {
            for step in 0..=1000 {
                let color = effect.color_at(base, f64::from(step) / 1000.0);
                assert!(color.r <= base.r && color.g <= base.g && color.b <= base.b);
            }
        }
    }

    #[test]
    fn test_strobe_threshold() {
        let base = Rgb { r: 12, g: 34, b: 56 };
        assert_eq!(StripEffect::Strobe.color_at(base, 0.19), BLACK);
        assert_eq!(StripEffect::Strobe.color_at(base, 0.21), base);
    }

    #[test]
    fn test_chase_presets_highlight_one_arm() {
        for preset in [ArmPreset::Patagonian, ArmPreset::Chalbi] {
            for elapsed in (0..1000).step_by(7) {
                let frame = arms(preset, 100, elapsed);
                let highlighted = frame[chase_index(ms(elapsed), CYCLE)];
                let differing = frame.iter().filter(|arm| **arm == highlighted).count();
                assert_eq!(differing, 1, "{preset:?} at {elapsed}ms: {frame:?}");
            }
        }
    }

    #[test]
    fn test_chase_index() {
        assert_eq!(chase_index(ms(0), CYCLE), 0);
        assert_eq!(chase_index(ms(62), CYCLE), 0);
        assert_eq!(chase_index(ms(63), CYCLE), 1);
        assert_eq!(chase_index(ms(190), CYCLE), 3);
        assert_eq!(chase_index(ms(250), CYCLE), 0);
        assert_eq!(chase_index(ms(1000), CYCLE), 0);
    }

    #[test]
    fn test_kalahari() {
        // Phase offsets 0, 2 and 4 radians
        let expected = Rgb { r: 128, g: 243, b: 31 };
        let frame = arms(ArmPreset::Kalahari, 100, 0);
        for arm in frame {
            assert!(colors_close(arm, expected, 1));
        }
        assert!(frame.iter().all(|arm| *arm == frame[0]));

        assert_eq!(arms(ArmPreset::Kalahari, 0, 0), [BLACK; ARM_COUNT]);
    }

    #[test]
    fn test_kalahari_quarter_cycle() {
        // A quarter of the cycle shifts every channel by 2 * PI * 6 * 0.25
        let expected = [0.0_f64, 2.0, 4.0].map(|phase| {
            let level = ((3.0 * std::f64::consts::PI + phase).sin() * 0.5 + 0.5) * 255.0;
            level.round() as u8
        });
        let expected = Rgb {
            r: expected[0],
            g: expected[1],
            b: expected[2],
        };

        let cycle = ms(2000);
        let frame = ArmPreset::Kalahari.arms_at(RED, 100, 0.25, ms(500), cycle);
        for arm in frame {
            assert!(colors_close(arm, expected, 1), "{arm:?} != {expected:?}");
        }
    }

    #[test]
    fn test_patagonian_phases() {
        assert_eq!(arms(ArmPreset::Patagonian, 100, 0), [RED, PURPLE, PURPLE, PURPLE]);
        assert_eq!(
            arms(ArmPreset::Patagonian, 100, 300),
            [DARK_PURPLE, RED, RED, RED]
        );
        // End of cycle keeps the last phase
        assert_eq!(arms(ArmPreset::Patagonian, 100, 1000), [GREEN, AQUA, AQUA, AQUA]);
    }

    #[test]
    fn test_chalbi_swaps_colors_halfway() {
        assert_eq!(
            arms(ArmPreset::Chalbi, 100, 0),
            [SUN_YELLOW, SKY_BLUE, SKY_BLUE, SKY_BLUE]
        );
        assert_eq!(
            arms(ArmPreset::Chalbi, 100, 600),
            [SUN_YELLOW, SKY_BLUE, SUN_YELLOW, SUN_YELLOW]
        );
    }

    #[test]
    fn test_chase_presets_scale_with_brightness() {
        let dim_yellow = Rgb { r: 128, g: 110, b: 0 };
        let dim_blue = Rgb { r: 0, g: 25, b: 128 };
        assert_eq!(
            arms(ArmPreset::Chalbi, 50, 0),
            [dim_yellow, dim_blue, dim_blue, dim_blue]
        );
    }

    #[test]
    fn test_thar_rotates_pairs() {
        assert_eq!(arms(ArmPreset::Thar, 100, 0), [BLUE, RED, BLUE, RED]);
        assert_eq!(arms(ArmPreset::Thar, 100, 63), [RED, BLUE, RED, BLUE]);
        assert_eq!(arms(ArmPreset::Thar, 100, 500), [GREEN, PURPLE, GREEN, PURPLE]);
        // End of cycle wraps to the first pair
        assert_eq!(arms(ArmPreset::Thar, 100, 1000), [BLUE, RED, BLUE, RED]);
    }

    #[test]
    fn test_solid_arms_use_base_color() {
        let base = Rgb { r: 10, g: 20, b: 30 };
        let arms = ArmPreset::Solid.arms_at(base, 10, 0.4, ms(400), CYCLE);
        assert_eq!(arms, [base; ARM_COUNT]);
    }

    #[test]
    fn test_compute_frame() {
        assert_eq!(
            compute_frame(
                AnimationKind::SingleStrip(StripEffect::Solid),
                RED,
                100,
                0.3,
                ms(300),
                CYCLE
            ),
            Frame::Single(RED)
        );

        let frame = compute_frame(
            AnimationKind::MultiArm(ArmPreset::Thar),
            RED,
            100,
            0.0,
            ms(0),
            CYCLE,
        );
        assert_eq!(frame, Frame::Arms([BLUE, RED, BLUE, RED]));
        assert_eq!(frame.colors().len(), ARM_COUNT);
        assert_eq!(Frame::Single(RED).colors(), &[RED]);
    }

    #[test]
    fn test_frames_are_deterministic() {
        for kind in [
            AnimationKind::SingleStrip(StripEffect::Mix),
            AnimationKind::MultiArm(ArmPreset::Kalahari),
            AnimationKind::MultiArm(ArmPreset::Patagonian),
        ] {
            let first = compute_frame(kind, GREEN, 70, 0.42, ms(420), CYCLE);
            let second = compute_frame(kind, GREEN, 70, 0.42, ms(420), CYCLE);
            assert_eq!(first, second);
        }
    }
}
