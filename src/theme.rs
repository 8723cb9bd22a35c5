use nu_ansi_term::{Color, Style};

use crate::program::Instruction;

pub mod catppuccin {
    use nu_ansi_term::Color;
    pub struct Mocha;
    impl Mocha {
        // Base colors
        pub const TEXT: Color = Color::Rgb(205, 214, 244);
        pub const OVERLAY0: Color = Color::Rgb(108, 112, 134);
        pub const SURFACE2: Color = Color::Rgb(88, 91, 112);

        // Accents
        pub const RED: Color = Color::Rgb(243, 139, 168);
        pub const GREEN: Color = Color::Rgb(166, 227, 161);
        pub const YELLOW: Color = Color::Rgb(249, 226, 175);
        pub const BLUE: Color = Color::Rgb(137, 180, 250);
        pub const MAUVE: Color = Color::Rgb(203, 166, 247);
        pub const PEACH: Color = Color::Rgb(250, 179, 135);
        pub const TEAL: Color = Color::Rgb(148, 226, 213);
        pub const SKY: Color = Color::Rgb(137, 220, 235);
    }
}

/// Debugger colors. Overridable from the `[colors]` config section.
#[derive(Debug, Clone, PartialEq)]
pub struct Palette {
    pub op_right: Color,      // '>'
    pub op_left: Color,       // '<'
    pub op_inc: Color,        // '+'
    pub op_dec: Color,        // '-'
    pub op_output: Color,     // '.'
    pub op_input: Color,      // ','
    pub op_bracket: Color,    // '[' and ']'
    pub op_breakpoint: Color, // '#'

    pub heading: Color,
    pub dim: Color,
    pub tape_cell_empty: Color,
    pub tape_cell_nonzero: Color,
    pub tape_cell_pointer: Color,
}

impl Default for Palette {
    fn default() -> Self {
        use catppuccin::Mocha as P;

        // > <   => SKY/TEAL (movement)
        // + -   => GREEN/RED (data modification)
        // . ,   => YELLOW/PEACH (I/O)
        // [ ]   => MAUVE (flow control)
        // #     => BLUE (breakpoint)
        Self {
            op_right: P::SKY,
            op_left: P::TEAL,
            op_inc: P::GREEN,
            op_dec: P::RED,
            op_output: P::YELLOW,
            op_input: P::PEACH,
            op_bracket: P::MAUVE,
            op_breakpoint: P::BLUE,

            heading: P::TEXT,
            dim: P::OVERLAY0,
            tape_cell_empty: P::SURFACE2,
            tape_cell_nonzero: P::TEXT,
            tape_cell_pointer: P::YELLOW,
        }
    }
}

impl Palette {
    #[inline]
    pub fn style_for(&self, instr: Instruction) -> Style {
        let color = match instr {
            Instruction::Right => self.op_right,
            Instruction::Left => self.op_left,
            Instruction::Inc => self.op_inc,
            Instruction::Dec => self.op_dec,
            Instruction::Output => self.op_output,
            Instruction::Input => self.op_input,
            Instruction::LoopStart | Instruction::LoopEnd => self.op_bracket,
            Instruction::Breakpoint => self.op_breakpoint,
        };
        Style::new().fg(color).bold()
    }
}

/// Parse `#RRGGBB` or a color name.
pub fn parse_color(value: &str) -> Option<Color> {
    let s = value.trim();
    if let Some(hex) = s.strip_prefix('#') {
        if hex.len() == 6 {
            if let (Ok(r), Ok(g), Ok(b)) = (
                u8::from_str_radix(&hex[0..2], 16),
                u8::from_str_radix(&hex[2..4], 16),
                u8::from_str_radix(&hex[4..6], 16),
            ) {
                return Some(Color::Rgb(r, g, b));
            }
        }
        return None;
    }

    let name = s.to_ascii_lowercase();
    Some(match name.as_str() {
        "black" => Color::Black,
        "red" => Color::Red,
        "green" => Color::Green,
        "yellow" => Color::Yellow,
        "blue" => Color::Blue,
        "magenta" | "purple" => Color::Magenta,
        "cyan" => Color::Cyan,
        "white" => Color::White,
        "gray" | "grey" | "lightgray" | "light_gray" => Color::LightGray,
        "darkgray" | "dark_grey" | "darkgrey" | "dark_gray" => Color::DarkGray,
        "lightred" | "light_red" => Color::LightRed,
        "lightgreen" | "light_green" => Color::LightGreen,
        "lightyellow" | "light_yellow" => Color::LightYellow,
        "lightblue" | "light_blue" => Color::LightBlue,
        "lightmagenta" | "light_magenta" => Color::LightMagenta,
        "lightcyan" | "light_cyan" => Color::LightCyan,
        _ => return None,
    })
}
