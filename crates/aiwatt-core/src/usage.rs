//! Workload descriptions for a single inference call.
//!
//! A [`Usage`] carries only the quantities relevant to its category. The category decides
//! which throughput figure is used to turn the workload into a processing time (see
//! [`crate::time`]).
//!
//! Serialized usages are tagged by `category`:
//!
//! ```json
//! { "category": "chat", "inputTokens": 1000, "outputTokens": 200 }
//! { "category": "audio.transcription", "audioSeconds": 30.0 }
//! ```

use crate::errors::ImpactError;
use crate::FloatValue;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Category of an inference workload.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum UsageCategory {
    #[serde(rename = "chat")]
    Chat,
    #[serde(rename = "text")]
    Text,
    #[serde(rename = "ocr")]
    Ocr,
    #[serde(rename = "embeddings")]
    Embeddings,
    #[serde(rename = "audio.transcription")]
    AudioTranscription,
    #[serde(rename = "audio.translation")]
    AudioTranslation,
    #[serde(rename = "audio.speech")]
    AudioSpeech,
    #[serde(rename = "image.generation")]
    ImageGeneration,
}

impl UsageCategory {
    pub const ALL: [UsageCategory; 8] = [
        Self::Chat,
        Self::Text,
        Self::Ocr,
        Self::Embeddings,
        Self::AudioTranscription,
        Self::AudioTranslation,
        Self::AudioSpeech,
        Self::ImageGeneration,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Chat => "chat",
            Self::Text => "text",
            Self::Ocr => "ocr",
            Self::Embeddings => "embeddings",
            Self::AudioTranscription => "audio.transcription",
            Self::AudioTranslation => "audio.translation",
            Self::AudioSpeech => "audio.speech",
            Self::ImageGeneration => "image.generation",
        }
    }
}

impl fmt::Display for UsageCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for UsageCategory {
    type Err = ImpactError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|category| category.as_str() == s)
            .ok_or_else(|| ImpactError::UnsupportedCategory(s.to_string()))
    }
}

/// Token counts for text-like workloads (chat, text, ocr).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TokenUsage {
    pub input_tokens: u64,
    pub output_tokens: u64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub processing_time_seconds: Option<FloatValue>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EmbeddingsUsage {
    pub input_tokens: u64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub processing_time_seconds: Option<FloatValue>,
}

/// Audio duration processed or produced, in seconds.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AudioUsage {
    pub audio_seconds: FloatValue,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub processing_time_seconds: Option<FloatValue>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ImageUsage {
    pub width: u32,
    pub height: u32,
    pub images: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub processing_time_seconds: Option<FloatValue>,
}

/// The workload of one inference call.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "category")]
pub enum Usage {
    #[serde(rename = "chat")]
    Chat(TokenUsage),
    #[serde(rename = "text")]
    Text(TokenUsage),
    #[serde(rename = "ocr")]
    Ocr(TokenUsage),
    #[serde(rename = "embeddings")]
    Embeddings(EmbeddingsUsage),
    #[serde(rename = "audio.transcription")]
    AudioTranscription(AudioUsage),
    #[serde(rename = "audio.translation")]
    AudioTranslation(AudioUsage),
    #[serde(rename = "audio.speech")]
    AudioSpeech(AudioUsage),
    #[serde(rename = "image.generation")]
    ImageGeneration(ImageUsage),
}

impl Usage {
    fn tokens(input_tokens: u64, output_tokens: u64) -> TokenUsage {
        TokenUsage {
            input_tokens,
            output_tokens,
            processing_time_seconds: None,
        }
    }

    fn audio(audio_seconds: FloatValue) -> AudioUsage {
        AudioUsage {
            audio_seconds,
            processing_time_seconds: None,
        }
    }

    pub fn chat(input_tokens: u64, output_tokens: u64) -> Self {
        Self::Chat(Self::tokens(input_tokens, output_tokens))
    }

    pub fn text(input_tokens: u64, output_tokens: u64) -> Self {
        Self::Text(Self::tokens(input_tokens, output_tokens))
    }

    pub fn ocr(input_tokens: u64, output_tokens: u64) -> Self {
        Self::Ocr(Self::tokens(input_tokens, output_tokens))
    }

    pub fn embeddings(input_tokens: u64) -> Self {
        Self::Embeddings(EmbeddingsUsage {
            input_tokens,
            processing_time_seconds: None,
        })
    }

    pub fn audio_transcription(audio_seconds: FloatValue) -> Self {
        Self::AudioTranscription(Self::audio(audio_seconds))
    }

    pub fn audio_translation(audio_seconds: FloatValue) -> Self {
        Self::AudioTranslation(Self::audio(audio_seconds))
    }

    pub fn audio_speech(audio_seconds: FloatValue) -> Self {
        Self::AudioSpeech(Self::audio(audio_seconds))
    }

    pub fn image_generation(width: u32, height: u32, images: u32) -> Self {
        Self::ImageGeneration(ImageUsage {
            width,
            height,
            images,
            processing_time_seconds: None,
        })
    }

    /// Attach a measured processing time, which then takes precedence over the
    /// throughput-derived time.
    pub fn with_processing_time(mut self, seconds: FloatValue) -> Self {
        *self.processing_time_slot() = Some(seconds);
        self
    }

    pub fn category(&self) -> UsageCategory {
        match self {
            Self::Chat(_) => UsageCategory::Chat,
            Self::Text(_) => UsageCategory::Text,
            Self::Ocr(_) => UsageCategory::Ocr,
            Self::Embeddings(_) => UsageCategory::Embeddings,
            Self::AudioTranscription(_) => UsageCategory::AudioTranscription,
            Self::AudioTranslation(_) => UsageCategory::AudioTranslation,
            Self::AudioSpeech(_) => UsageCategory::AudioSpeech,
            Self::ImageGeneration(_) => UsageCategory::ImageGeneration,
        }
    }

    /// The processing time override carried by the usage itself, if any.
    pub fn processing_time_seconds(&self) -> Option<FloatValue> {
        match self {
            Self::Chat(u) | Self::Text(u) | Self::Ocr(u) => u.processing_time_seconds,
            Self::Embeddings(u) => u.processing_time_seconds,
            Self::AudioTranscription(u) | Self::AudioTranslation(u) | Self::AudioSpeech(u) => {
                u.processing_time_seconds
            }
            Self::ImageGeneration(u) => u.processing_time_seconds,
        }
    }

    fn processing_time_slot(&mut self) -> &mut Option<FloatValue> {
        match self {
            Self::Chat(u) | Self::Text(u) | Self::Ocr(u) => &mut u.processing_time_seconds,
            Self::Embeddings(u) => &mut u.processing_time_seconds,
            Self::AudioTranscription(u) | Self::AudioTranslation(u) | Self::AudioSpeech(u) => {
                &mut u.processing_time_seconds
            }
            Self::ImageGeneration(u) => &mut u.processing_time_seconds,
        }
    }
}
