//! プロンプト生成モジュール
//!
//! CLIとWeb(WASM)で共有される生成プロンプトの組み立て:
//! - シーン説明・背景・見出しテキスト
//! - スタイルとアスペクト比
//! - 添付画像ごとの役割指示

use crate::types::{AspectRatio, GenerationSettings};

/// 生成プロンプトを作成
///
/// 添付画像はリクエスト内で「人物 → 参考画像」の順に並ぶ前提で番号を振る
pub fn build_generation_prompt(settings: &GenerationSettings) -> String {
    let mut sections = vec![format!("Scene: {}", settings.main_prompt)];

    if !settings.background_prompt.is_empty() {
        sections.push(format!("Environment: {}", settings.background_prompt));
    }

    if !settings.headline_text.is_empty() {
        sections.push(format!(
            "Overlay headline text, rendered exactly as written with clean legible typography: \"{}\"",
            settings.headline_text
        ));
    }

    sections.push(format!("Visual style: {}", settings.style_preset));
    sections.push(format!(
        "Composition: {} frame",
        match settings.aspect_ratio {
            AspectRatio::Landscape => "16:9 landscape",
            AspectRatio::Portrait => "9:16 portrait",
        }
    ));

    let mut image_index = 0;
    let mut image_notes = Vec::new();
    for actor in &settings.actors {
        image_index += 1;
        if actor.emotion.trim().is_empty() {
            image_notes.push(format!(
                "- Image {}: main actor. Keep the face and identity consistent.",
                image_index
            ));
        } else {
            image_notes.push(format!(
                "- Image {}: main actor. Keep the face and identity consistent, expression: {}.",
                image_index,
                actor.emotion.trim()
            ));
        }
    }
    for (i, _) in settings.references.iter().enumerate() {
        image_index += 1;
        let role = match i {
            0 => "layout/thumbnail reference. Match its composition and color mood",
            1 => "logo. Place it unaltered in a corner",
            _ => "additional reference",
        };
        image_notes.push(format!("- Image {}: {}.", image_index, role));
    }

    if !image_notes.is_empty() {
        sections.push(format!("Attached images:\n{}", image_notes.join("\n")));
    }

    sections.join("\n\n")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data_url::DataUrl;
    use crate::types::{Actor, AspectRatio, AttachmentId, ImageResolution, UploadedImage};

    fn base() -> GenerationSettings {
        GenerationSettings {
            model_id: "gemini-3-pro-image-preview".into(),
            main_prompt: "a detective in the rain".into(),
            background_prompt: String::new(),
            headline_text: String::new(),
            image_resolution: ImageResolution::OneK,
            aspect_ratio: AspectRatio::Landscape,
            style_preset: "Neon Cyberpunk".into(),
            generation_count: 1,
            actors: vec![],
            references: vec![],
        }
    }

    fn image(id: u32) -> UploadedImage {
        UploadedImage {
            id: AttachmentId(id),
            file_name: format!("{id}.png"),
            data: DataUrl::parse("data:image/png;base64,AAAA").unwrap(),
        }
    }

    #[test]
    fn test_minimal_prompt() {
        let prompt = build_generation_prompt(&base());
        assert!(prompt.starts_with("Scene: a detective in the rain"));
        assert!(prompt.contains("Visual style: Neon Cyberpunk"));
        assert!(prompt.contains("16:9 landscape"));
        assert!(!prompt.contains("Environment"));
        assert!(!prompt.contains("Attached images"));
    }

    #[test]
    fn test_optional_sections() {
        let mut settings = base();
        settings.background_prompt = "rooftop at night".into();
        settings.headline_text = "CASE CLOSED".into();
        settings.aspect_ratio = AspectRatio::Portrait;

        let prompt = build_generation_prompt(&settings);
        assert!(prompt.contains("Environment: rooftop at night"));
        assert!(prompt.contains("\"CASE CLOSED\""));
        assert!(prompt.contains("9:16 portrait"));
    }

    #[test]
    fn test_image_roles_numbered_in_order() {
        let mut settings = base();
        settings.actors = vec![Actor {
            image: image(1),
            emotion: "furious".into(),
        }];
        settings.references = vec![image(2), image(3)];

        let prompt = build_generation_prompt(&settings);
        assert!(prompt.contains("- Image 1: main actor"));
        assert!(prompt.contains("expression: furious"));
        assert!(prompt.contains("- Image 2: layout/thumbnail reference"));
        assert!(prompt.contains("- Image 3: logo"));
    }
}
