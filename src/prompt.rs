//! Prompt composition for every generation call.
//!
//! Everything here is pure string assembly. The policy block and templates are
//! passed through to the model verbatim and carry no behaviour of their own.

use crate::models::{
    AgeGroup, CoverStyle, FeatureKind, GenerationRequest, StickerStyle, TextParams,
};

/// Number of pages requested from the story model.
pub const STORY_PAGE_COUNT: usize = 6;

/// Policy block prepended to every image prompt that carries a reference photo.
pub const IDENTITY_LOCK: &str = "\
IDENTITY & CHROMATIC FIDELITY LOCK:
1. SKIN TONE: Treat the reference photo's skin as the visual truth. Reproduce its exact tone and luminosity. Do not lighten or darken the complexion.
2. NEUTRAL DESCRIPTORS: Words such as \"curly hair\", \"braids\" or \"pigtails\" describe geometry and texture only. They must never change skin tone or facial structure.
3. FACIAL ANCHORING: Keep the facial structure, eye shape, nose bridge and lip shape of the child in the photo. The result must be a 1:1 likeness.
4. NO PRESETS: Ignore statistical defaults. The photo alone decides how the child looks.";

const DEFAULT_SKIN_TONE_HINT: &str = "Maintain fair/light complexion from photo highlights";

/// Builds the final instruction string for `request`.
///
/// Deterministic for identical input. The identity block is present if and only if
/// an image request carries a source photo.
pub fn compose_prompt(request: &GenerationRequest) -> String {
    let params = &request.params;
    let with_photo = request.source_image.is_some();
    let mut lines: Vec<String> = Vec::new();
    if with_photo {
        lines.push(IDENTITY_LOCK.to_string());
    }

    match request.kind {
        FeatureKind::Story => return story_text_prompt(params),
        FeatureKind::Photo => {
            lines.push("TASK: Create a photorealistic artpiece.".into());
            lines.push(format!("SCENE: {}", photo_scene(params)));
            if with_photo {
                lines.push(
                    "MANDATORY: The subject in the output MUST be an identical twin of the child in the photo. Match the exact complexion and facial identity."
                        .into(),
                );
            }
        }
        FeatureKind::Illustration => {
            lines.push("STYLE: Premium 2D children's book digital art.".into());
            lines.push(format!("SCENE: {}", params.scene));
            if with_photo {
                lines.push(
                    "FIDELITY: The character MUST match the photo's identity exactly, especially skin tone and facial features."
                        .into(),
                );
            }
            if !params.appearance_notes.is_empty() {
                lines.push(format!(
                    "STYLE NOTES: {}. (These describe outfit and hair texture ONLY and must never change skin tone.)",
                    params.appearance_notes
                ));
            }
        }
        FeatureKind::Coloring => {
            lines.push("STYLE: Clean line art coloring page. Bold outlines, white background.".into());
            if !params.scene.is_empty() {
                lines.push(format!("SCENE: {}", params.scene));
            }
            if with_photo {
                lines.push(
                    "IDENTITY MATCH: Draw the child with the exact facial features and proportions of the person in the photo."
                        .into(),
                );
            }
            if !params.appearance_notes.is_empty() {
                lines.push(format!("NOTES: {}.", params.appearance_notes));
            }
        }
        FeatureKind::Sticker => {
            lines.push("STYLE: Die-cut sticker, white border, white background.".into());
            lines.push(format!("VIBE: {}.", params.scene));
            if with_photo {
                lines.push(
                    "MANDATORY FIDELITY: The character in the sticker MUST be an identical visual match to the reference photo. Sample the exact skin tone."
                        .into(),
                );
            }
            if !params.appearance_notes.is_empty() {
                lines.push(format!("SPECIFIC DETAILS: {}", params.appearance_notes));
            }
        }
    }

    if with_photo && !params.skin_tone.is_empty() {
        lines.push(format!("SKIN TONE: {}", params.skin_tone));
    }

    lines.join("\n")
}

/// Request for the story text model.
pub fn story_text_prompt(params: &TextParams) -> String {
    format!(
        "Write a creative {}-page children's story for a {} named {}. Theme: {}. Return JSON with \"text\" and \"illustrationPrompt\" for each page.",
        STORY_PAGE_COUNT, params.age_group, params.child_name, params.theme
    )
}

/// Scene line for a photo composite with a companion character.
pub fn photo_scene(params: &TextParams) -> String {
    format!(
        "Generate a photorealistic image of the child from the provided photo appearing TOGETHER WITH a {character}.\n\
         SCENE: {theme} theme. {location}. Action: {pose}.\n\
         STYLE: {style}. Character details: {character} as {variant}.\n\
         IDENTITY: The child must look exactly like the photo. Match skin tone and hair.\n\
         DETAILS: {notes}.",
        character = params.character,
        theme = params.theme,
        location = params.location,
        pose = params.pose,
        style = params.style,
        variant = params.character_variant,
        notes = params.custom_notes,
    )
}

/// Consistency notes attached to every storybook illustration.
pub fn identity_anchor(notes: &str) -> String {
    format!(
        "STRICT CHARACTER CONSISTENCY: This is the MAIN HERO. \
         MATCH PHOTO 100%: facial structure, eye shape and nose must match the reference photo exactly. \
         HAIR LOCK: the hairstyle MUST keep the exact length and texture of the photo. \
         NOTES: {}",
        notes.trim()
    )
}

/// Skin tone line for storybook pages, falling back to the photo's highlights.
pub fn skin_tone_hint(skin_tone: &str) -> &str {
    match skin_tone.trim() {
        "" => DEFAULT_SKIN_TONE_HINT,
        tone => tone,
    }
}

/// Scene for the storybook cover, rendered either in colour or as line art.
pub fn story_cover_scene(prompt: &str, style: CoverStyle) -> String {
    let likeness = format!(
        "BOOK COVER MASTERPIECE: {}. The central character MUST have an absolute face match to the provided photo.",
        prompt
    );
    match style {
        CoverStyle::Coloring => format!(
            "COVER COLORING PAGE: {}. Bold black outlines, pure white background, ready to be colored.",
            likeness
        ),
        CoverStyle::Colorful => format!(
            "VIBRANT BOOK COVER: {}. Lush colors, magical lighting, professional children's book style.",
            likeness
        ),
    }
}

pub fn age_complexity(age: AgeGroup) -> &'static str {
    match age {
        AgeGroup::Toddler => "very simple outlines, large shapes, low detail",
        AgeGroup::Preschool => "medium detail, clear lines",
        AgeGroup::EarlyReader => "higher detail, intricate patterns",
    }
}

/// Cover scene followed by `pages` coloring-page scenes for a coloring book.
pub fn coloring_book_scenes(
    child_name: &str,
    theme: &str,
    age: AgeGroup,
    pages: usize,
) -> Vec<String> {
    let title = if child_name.trim().is_empty() {
        "My Adventure".to_string()
    } else {
        format!("{}'s Adventure", child_name.trim())
    };
    let hero = if child_name.trim().is_empty() {
        "the kid"
    } else {
        child_name.trim()
    };
    let base = format!(
        "Target audience: {}. Complexity level: {}. Include the character named {}.",
        age.label(),
        age_complexity(age),
        hero
    );

    let templates = [
        format!(
            "Action scene showing the character based on photo interacting with {}. Fun and dynamic pose.",
            theme
        ),
        format!(
            "Detailed background scene with the character based on photo exploring the world of {}.",
            theme
        ),
        format!(
            "Calm scene with the character based on photo relaxing after an adventure in {}.",
            theme
        ),
    ];

    let mut scenes = Vec::with_capacity(pages + 1);
    scenes.push(format!(
        "A bright, vibrant, and colorful children's book cover illustration. Title concept: {}. Theme: {}. Make it look like a professional coloring book cover.",
        title, theme
    ));
    for i in 0..pages {
        scenes.push(format!("{} {}", templates[i % templates.len()], base));
    }
    scenes
}

pub fn sticker_style_prompt(style: StickerStyle) -> &'static str {
    match style {
        StickerStyle::Avatar3d => {
            "3D Pixar-style rendered character, cute, expressive, soft lighting, 3d render"
        }
        StickerStyle::Chibi => "Chibi anime style, large head, small body, cute, vibrant, flat color",
        StickerStyle::Cartoon => "Classic Saturday morning cartoon style, bold outlines, flat colors",
        StickerStyle::Superhero => {
            "Wearing a generic superhero costume with cape, heroic pose, comic book style"
        }
        StickerStyle::Emoji => "Expressive emoji style face sticker, round, emotive, vector",
        StickerStyle::PixelArt => "Retro 8-bit pixel art style, arcade game look",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::ImageData;

    fn photo() -> ImageData {
        ImageData::new("image/jpeg", vec![0xff, 0xd8])
    }

    fn request(kind: FeatureKind, with_photo: bool) -> GenerationRequest {
        GenerationRequest::new(
            kind,
            with_photo.then(photo),
            TextParams::new()
                .with_scene("A picnic on the moon")
                .with_appearance_notes("curly hair, glasses"),
        )
    }

    #[test]
    fn identical_input_gives_identical_prompt() {
        for kind in [
            FeatureKind::Photo,
            FeatureKind::Illustration,
            FeatureKind::Coloring,
            FeatureKind::Sticker,
            FeatureKind::Story,
        ] {
            let req = request(kind, true);
            assert_eq!(compose_prompt(&req), compose_prompt(&req.clone()), "{kind}");
        }
    }

    #[test]
    fn identity_block_follows_source_image() {
        for kind in [
            FeatureKind::Photo,
            FeatureKind::Illustration,
            FeatureKind::Coloring,
            FeatureKind::Sticker,
        ] {
            assert!(compose_prompt(&request(kind, true)).starts_with(IDENTITY_LOCK), "{kind}");
            assert!(!compose_prompt(&request(kind, false)).contains(IDENTITY_LOCK), "{kind}");
        }
    }

    #[test]
    fn story_prompt_never_carries_identity_block() {
        let req = GenerationRequest::new(
            FeatureKind::Story,
            Some(photo()),
            TextParams::new()
                .with_child_name("Maya")
                .with_age_group(AgeGroup::Toddler.label())
                .with_theme("dinosaurs"),
        );
        let prompt = compose_prompt(&req);
        assert!(!prompt.contains(IDENTITY_LOCK));
        assert!(prompt.contains("6-page"));
        assert!(prompt.contains("Toddler (2-3) named Maya"));
        assert!(prompt.contains("Theme: dinosaurs"));
    }

    #[test]
    fn empty_params_are_tolerated() {
        let req = GenerationRequest::new(FeatureKind::Photo, Some(photo()), TextParams::new());
        let prompt = compose_prompt(&req);
        assert!(prompt.contains("TOGETHER WITH a ."));
        let req = GenerationRequest::new(FeatureKind::Sticker, None, TextParams::new());
        assert_eq!(
            compose_prompt(&req),
            "STYLE: Die-cut sticker, white border, white background.\nVIBE: ."
        );
    }

    #[test]
    fn appearance_notes_are_appended() {
        let prompt = compose_prompt(&request(FeatureKind::Illustration, true));
        assert!(prompt.contains("STYLE NOTES: curly hair, glasses."));
        let prompt = compose_prompt(&request(FeatureKind::Coloring, false));
        assert!(prompt.contains("NOTES: curly hair, glasses."));
        assert!(prompt.contains("SCENE: A picnic on the moon"));
    }

    #[test]
    fn skin_tone_hint_only_with_photo() {
        let mut req = request(FeatureKind::Illustration, true);
        req.params.skin_tone = "warm light olive".into();
        assert!(compose_prompt(&req).ends_with("SKIN TONE: warm light olive"));
        req.source_image = None;
        assert!(!compose_prompt(&req).contains("SKIN TONE"));
    }

    #[test]
    fn identity_anchor_leaves_skin_tone_to_its_own_line() {
        let anchor = identity_anchor(" freckles ");
        assert!(anchor.ends_with("NOTES: freckles"));
        assert!(!anchor.contains("SKIN TONE"));
        assert_eq!(skin_tone_hint("  "), DEFAULT_SKIN_TONE_HINT);
        assert_eq!(skin_tone_hint(" deep brown "), "deep brown");
    }

    #[test]
    fn cover_scene_depends_on_style() {
        assert!(story_cover_scene("A dragon", CoverStyle::Coloring).starts_with("COVER COLORING PAGE"));
        assert!(story_cover_scene("A dragon", CoverStyle::Colorful).starts_with("VIBRANT BOOK COVER"));
    }

    #[test]
    fn coloring_book_has_cover_plus_pages() {
        let scenes = coloring_book_scenes("Leo", "pirates", AgeGroup::Toddler, 2);
        assert_eq!(scenes.len(), 3);
        assert!(scenes[0].contains("Leo's Adventure"));
        assert!(scenes[1].contains("very simple outlines"));
        assert!(scenes[2].contains("exploring the world of pirates"));

        let anonymous = coloring_book_scenes("", "space", AgeGroup::EarlyReader, 4);
        assert_eq!(anonymous.len(), 5);
        assert!(anonymous[0].contains("My Adventure"));
        assert!(anonymous[4].contains("named the kid"));
    }
}
