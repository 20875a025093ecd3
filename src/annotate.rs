use crate::scorer::Scored;

// room for 7 characters plus the terminator on the display side
const LABEL_MAX_LEN: usize = 7;
const MAX_COLOR: f32 = 0.6;
const BASE_COLOR: f32 = 0.2;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Rgba {
    pub red: f32,
    pub green: f32,
    pub blue: f32,
    pub alpha: f32,
}

impl Rgba {
    /// Opaque-ish red that gets stronger with danger.
    pub fn for_danger(danger: f32) -> Self {
        let c = (danger * MAX_COLOR).min(MAX_COLOR);

        Self {
            red: c + BASE_COLOR,
            green: BASE_COLOR,
            blue: BASE_COLOR,
            alpha: c + BASE_COLOR,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Annotation {
    pub frame: usize,
    pub detection: usize,
    pub label: String,
    /// Background fill, only set when drawing is enabled.
    pub bg_color: Option<Rgba>,
    pub border_width: u32,
}

pub fn label(danger: f32) -> String {
    let mut text = format!("{:.2}", danger);
    text.truncate(LABEL_MAX_LEN);
    text
}

impl Scored {
    pub fn annotations(&self, draw: bool) -> Vec<Annotation> {
        self.frames()
            .iter()
            .enumerate()
            .flat_map(|(fidx, frame)| {
                frame
                    .people
                    .iter()
                    .zip(self.origins(fidx))
                    .map(move |(person, &detection)| Annotation {
                        frame: fidx,
                        detection,
                        label: label(person.danger_val),
                        bg_color: draw.then(|| Rgba::for_danger(person.danger_val)),
                        border_width: if draw { 0 } else { 1 },
                    })
            })
            .collect()
    }
}
