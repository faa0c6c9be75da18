use crate::shapes::ShapeKind;

/// Formats a system prompt for LLM integration
pub fn format_system_prompt() -> String {
    let intro = "You are an AI artist that draws in Microsoft Paint by dragging the mouse \
along generated paths.\n\
Your job is to turn a drawing idea into a sequence of pattern requests, one per shape.\n\n\
The path generator exposes the following JSON-RPC methods:\n\n";

    let operations =
        "1. **generate_path** - Compute the points of a shape from a full shape descriptor\n\
2. **generate_pattern** - Compute the points of a shape from a pattern query\n\
3. **draw_shape** - Drag the mouse along a shape described by a shape descriptor\n\
4. **draw_pattern** - Drag (or click, for dots) a pattern query onto the canvas\n\
5. **list_shapes** - List the available shapes\n\
6. **get_prompt** - Get this text, or the description of one shape\n";

    let instructions = format!(
        "\nA pattern query looks like: \
pattern:<name>, x:<center x>, y:<center y>, size:<size in pixels>\n\
Available patterns: {}, dots.\n\n\
For example, for \"a star above a wave\" you might send:\n\
1. draw_pattern with {{\"query\": \"pattern:star, x:400, y:200, size:50\"}}\n\
2. draw_pattern with {{\"query\": \"pattern:wave, x:400, y:350, size:80\"}}\n\n\
Remember: all coordinates are relative to the canvas, with (0,0) at the top-left corner.",
        shape_names().join(", ")
    );

    format!("{}{}{}", intro, operations, instructions)
}

fn shape_names() -> Vec<&'static str> {
    ShapeKind::ALL.iter().map(|kind| kind.name()).collect()
}

/// Returns a short description of a pattern, as used in tool listings
pub fn get_prompt(pattern: &str) -> Option<String> {
    let prompt = match pattern {
        "circle" => "A closed circle of radius `size` around (x, y).",
        "square" => "A closed axis-aligned square with side `size` centred on (x, y).",
        "triangle" => "A closed equilateral triangle with side `size`, apex up, centred on (x, y).",
        "star" => {
            "A closed five-pointed star; tips at distance `size`, inner corners at half that."
        }
        "heart" => "A closed heart shape about 2 x `size` wide, centred on (x, y).",
        "spiral" => "An open spiral winding out from (x, y) to radius `size` over two turns.",
        "zigzag" => {
            "An open zigzag from x - size to x + size with peaks size/2 below the baseline."
        }
        "wave" => "An open sine wave from x - size to x + size with amplitude size/2.",
        "scribble" => "An open random scribble starting at (x, y); different every time.",
        "line" => "A straight horizontal line from x - size to x + size.",
        "dots" => "A 7 x 5 grid of single clicks centred on (x, y), spaced size/2.5 apart.",
        _ => return None,
    };

    Some(prompt.to_string())
}

/// Gets all available pattern prompts
pub fn get_all_prompts() -> Vec<(String, String)> {
    shape_names()
        .into_iter()
        .chain(std::iter::once("dots"))
        .filter_map(|name| get_prompt(name).map(|prompt| (name.to_string(), prompt)))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_every_pattern_has_a_prompt() {
        let prompts = get_all_prompts();
        assert_eq!(prompts.len(), ShapeKind::ALL.len() + 1);
        assert!(prompts.iter().any(|(name, _)| name == "dots"));
    }

    #[test]
    fn test_system_prompt_lists_shapes() {
        let prompt = format_system_prompt();
        for kind in ShapeKind::ALL {
            assert!(prompt.contains(kind.name()), "missing {}", kind);
        }
        assert!(prompt.contains("pattern:star, x:400, y:200, size:50"));
    }

    #[test]
    fn test_unknown_prompt() {
        assert!(get_prompt("blob").is_none());
    }
}
