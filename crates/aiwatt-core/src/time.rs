//! Processing time derived from the workload.
//!
//! | Category                         | Time                                          |
//! |----------------------------------|-----------------------------------------------|
//! | chat, text, ocr                  | (input + output tokens) / tokens per second   |
//! | embeddings                       | input tokens / tokens per second              |
//! | audio.transcription/translation/speech | audio seconds / audio seconds per second |
//! | image.generation                 | width x height x images / pixels per second   |
//!
//! A processing time carried by the usage itself takes precedence over all of the above.

use crate::errors::{CalcResult, ImpactError};
use crate::inputs::ThroughputConfig;
use crate::usage::{Usage, UsageCategory};
use crate::validation::require_positive;
use crate::FloatValue;

/// Look up the throughput rate a category depends on.
fn required_rate(
    throughput: Option<&ThroughputConfig>,
    category: UsageCategory,
    field: &str,
    select: impl Fn(&ThroughputConfig) -> Option<FloatValue>,
) -> CalcResult<FloatValue> {
    match throughput.and_then(select) {
        Some(rate) => require_positive(&format!("throughput.{field}"), rate),
        None => Err(ImpactError::MissingThroughput {
            field: format!("throughput.{field}"),
            category: category.to_string(),
        }),
    }
}

fn tokens_per_second(
    throughput: Option<&ThroughputConfig>,
    category: UsageCategory,
) -> CalcResult<FloatValue> {
    required_rate(throughput, category, "tokensPerSecond", |t| t.tokens_per_second)
}

fn count(field: &str, value: impl Into<f64>) -> CalcResult<FloatValue> {
    require_positive(field, value.into())
}

/// Processing time in seconds for `usage`.
///
/// Fails if a workload quantity is not positive, or if the throughput rate needed by the
/// usage category is missing or not positive.
pub fn derive_processing_time_seconds(
    usage: &Usage,
    throughput: Option<&ThroughputConfig>,
) -> CalcResult<FloatValue> {
    if let Some(seconds) = usage.processing_time_seconds() {
        return require_positive("usage.processingTimeSeconds", seconds);
    }

    let category = usage.category();
    match usage {
        Usage::Chat(u) | Usage::Text(u) | Usage::Ocr(u) => {
            let input = count("usage.inputTokens", u.input_tokens as f64)?;
            let output = count("usage.outputTokens", u.output_tokens as f64)?;
            Ok((input + output) / tokens_per_second(throughput, category)?)
        }
        Usage::Embeddings(u) => {
            let input = count("usage.inputTokens", u.input_tokens as f64)?;
            Ok(input / tokens_per_second(throughput, category)?)
        }
        Usage::AudioTranscription(u) | Usage::AudioTranslation(u) | Usage::AudioSpeech(u) => {
            let audio = count("usage.audioSeconds", u.audio_seconds)?;
            let rate = required_rate(throughput, category, "audioSecondsPerSecond", |t| {
                t.audio_seconds_per_second
            })?;
            Ok(audio / rate)
        }
        Usage::ImageGeneration(u) => {
            let width = count("usage.width", u.width)?;
            let height = count("usage.height", u.height)?;
            let images = count("usage.images", u.images)?;
            let rate =
                required_rate(throughput, category, "pixelsPerSecond", |t| t.pixels_per_second)?;
            Ok(width * height * images / rate)
        }
    }
}

/// Scale a processing time by an efficiency factor.
///
/// An efficiency factor of 2 means the work completes twice as fast as the stated
/// throughput implies.
pub fn apply_efficiency_factor(
    processing_time_seconds: FloatValue,
    efficiency_factor: Option<FloatValue>,
) -> CalcResult<FloatValue> {
    match efficiency_factor {
        Some(factor) => {
            Ok(processing_time_seconds / require_positive("efficiencyFactor", factor)?)
        }
        None => Ok(processing_time_seconds),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use is_close::is_close;

    #[test]
    fn test_token_categories() {
        let throughput = ThroughputConfig::tokens(100.0);
        for usage in [
            Usage::chat(1000, 200),
            Usage::text(1000, 200),
            Usage::ocr(1000, 200),
        ] {
            let seconds = derive_processing_time_seconds(&usage, Some(&throughput)).unwrap();
            assert!(is_close!(seconds, 12.0), "{usage:?}: {seconds}");
        }
    }

    #[test]
    fn test_embeddings() {
        let seconds = derive_processing_time_seconds(
            &Usage::embeddings(5000),
            Some(&ThroughputConfig::tokens(1000.0)),
        )
        .unwrap();
        assert!(is_close!(seconds, 5.0));
    }

    #[test]
    fn test_audio_categories() {
        let throughput = ThroughputConfig::audio(20.0);
        for usage in [
            Usage::audio_transcription(60.0),
            Usage::audio_translation(60.0),
            Usage::audio_speech(60.0),
        ] {
            let seconds = derive_processing_time_seconds(&usage, Some(&throughput)).unwrap();
            assert!(is_close!(seconds, 3.0), "{usage:?}: {seconds}");
        }
    }

    #[test]
    fn test_image_generation() {
        // 1024 * 1024 * 2 px at 2^20 px/s = 2 s
        let seconds = derive_processing_time_seconds(
            &Usage::image_generation(1024, 1024, 2),
            Some(&ThroughputConfig::pixels(1_048_576.0)),
        )
        .unwrap();
        assert!(is_close!(seconds, 2.0));
    }

    #[test]
    fn test_usage_override_skips_throughput() {
        let usage = Usage::chat(1000, 200).with_processing_time(7.5);
        let seconds = derive_processing_time_seconds(&usage, None).unwrap();
        assert!(is_close!(seconds, 7.5));

        let usage = Usage::chat(1000, 200).with_processing_time(0.0);
        let err = derive_processing_time_seconds(&usage, None).unwrap_err();
        assert_eq!(err.field(), Some("usage.processingTimeSeconds"));
    }

    #[test]
    fn test_missing_throughput_names_field() {
        let err = derive_processing_time_seconds(&Usage::chat(10, 10), None).unwrap_err();
        assert!(matches!(
            err,
            ImpactError::MissingThroughput { ref field, ref category }
                if field == "throughput.tokensPerSecond" && category == "chat"
        ));

        // A rate for another category does not count.
        let err = derive_processing_time_seconds(
            &Usage::audio_speech(10.0),
            Some(&ThroughputConfig::tokens(100.0)),
        )
        .unwrap_err();
        assert_eq!(err.field(), Some("throughput.audioSecondsPerSecond"));
    }

    #[test]
    fn test_non_positive_throughput() {
        let err = derive_processing_time_seconds(
            &Usage::image_generation(512, 512, 1),
            Some(&ThroughputConfig::pixels(0.0)),
        )
        .unwrap_err();
        assert_eq!(err.field(), Some("throughput.pixelsPerSecond"));
    }

    #[test]
    fn test_non_positive_workload() {
        let throughput = ThroughputConfig::tokens(100.0);
        let err = derive_processing_time_seconds(&Usage::chat(0, 10), Some(&throughput))
            .unwrap_err();
        assert_eq!(err.field(), Some("usage.inputTokens"));

        let err = derive_processing_time_seconds(
            &Usage::image_generation(512, 0, 1),
            Some(&ThroughputConfig::pixels(1e6)),
        )
        .unwrap_err();
        assert_eq!(err.field(), Some("usage.height"));
    }

    #[test]
    fn test_efficiency_factor() {
        assert!(is_close!(apply_efficiency_factor(12.0, None).unwrap(), 12.0));
        assert!(is_close!(apply_efficiency_factor(12.0, Some(2.0)).unwrap(), 6.0));
        assert!(apply_efficiency_factor(12.0, Some(0.0)).is_err());
    }
}
