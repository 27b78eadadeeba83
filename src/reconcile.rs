/*!
 * Audio-duration reconciliation.
 *
 * Generated narration length is unpredictable (synthesizer pacing), so the
 * visual timeline is stretched or compressed to match the measured audio
 * duration rather than re-synthesizing audio. Operates on the flattened,
 * globally-offset block list.
 */

use log::debug;

use crate::timeline::WritingBlock;

/// Rescale every block's start and duration to match a measured audio length
///
/// A measured duration of 1 second or less means the probe failed or the
/// track is unusable; reconciliation is skipped. A timeline whose current
/// maximum end is zero is also left untouched.
pub fn scale_blocks_to_duration(blocks: &mut [WritingBlock], measured_secs: f64) {
    if measured_secs <= 1.0 {
        debug!("Skipping timeline reconciliation, measured duration {:.2}s", measured_secs);
        return;
    }

    let current_max_end = blocks
        .iter()
        .map(|b| b.start_secs + b.duration_secs)
        .fold(0.0_f64, f64::max);

    if current_max_end <= 0.0 {
        return;
    }

    let scale = measured_secs / current_max_end;
    debug!(
        "Reconciling timeline: {:.2}s -> {:.2}s (scale {:.4})",
        current_max_end, measured_secs, scale
    );

    for block in blocks.iter_mut() {
        block.start_secs *= scale;
        block.duration_secs *= scale;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn block(start: f64, duration: f64) -> WritingBlock {
        WritingBlock {
            text: "text".to_string(),
            start_secs: start,
            duration_secs: duration,
            x: 120,
            y: 140,
            font_size: 40,
            color: "white".to_string(),
            highlight: false,
        }
    }

    #[test]
    fn test_scaleBlocks_withLongerAudio_shouldStretchExactly() {
        // Last block ends at 80s, audio measures 120s: everything scales by 1.5
        let mut blocks = vec![block(0.0, 10.0), block(20.0, 30.0), block(60.0, 20.0)];

        scale_blocks_to_duration(&mut blocks, 120.0);

        assert_eq!(blocks[0].start_secs, 0.0);
        assert_eq!(blocks[0].duration_secs, 15.0);
        assert_eq!(blocks[1].start_secs, 30.0);
        assert_eq!(blocks[1].duration_secs, 45.0);
        assert_eq!(blocks[2].start_secs, 90.0);
        assert_eq!(blocks[2].duration_secs, 30.0);
    }

    #[test]
    fn test_scaleBlocks_appliedTwice_shouldBeIdempotent() {
        let mut blocks = vec![block(0.0, 5.0), block(6.0, 4.0)];

        scale_blocks_to_duration(&mut blocks, 40.0);
        let after_first: Vec<(f64, f64)> =
            blocks.iter().map(|b| (b.start_secs, b.duration_secs)).collect();

        scale_blocks_to_duration(&mut blocks, 40.0);
        for (b, (start, duration)) in blocks.iter().zip(after_first) {
            assert!((b.start_secs - start).abs() < 1e-9);
            assert!((b.duration_secs - duration).abs() < 1e-9);
        }
    }

    #[test]
    fn test_scaleBlocks_withProbeFailure_shouldSkip() {
        let mut blocks = vec![block(0.0, 5.0)];

        scale_blocks_to_duration(&mut blocks, 0.0);

        assert_eq!(blocks[0].duration_secs, 5.0);
    }

    #[test]
    fn test_scaleBlocks_withEmptyTimeline_shouldNotPanic() {
        let mut blocks: Vec<WritingBlock> = Vec::new();
        scale_blocks_to_duration(&mut blocks, 60.0);
        assert!(blocks.is_empty());
    }
}
