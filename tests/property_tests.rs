use proptest::prelude::*;
use spark_view::buffer::{FrameBuffer, VerticalAlignment};
use spark_view::renderer::build_output_lines;
use spark_view::style::{Attr, Color, RESET, Style, encode, strip, truncate, visible_length};

fn color() -> impl Strategy<Value = Color> {
    prop_oneof![
        Just(Color::Default),
        (0u8..16).prop_map(Color::Named),
        any::<u8>().prop_map(Color::Indexed),
        (any::<u8>(), any::<u8>(), any::<u8>()).prop_map(|(r, g, b)| Color::Rgb(r, g, b)),
    ]
}

fn style() -> impl Strategy<Value = Style> {
    (color(), color(), any::<u8>()).prop_map(|(fg, bg, bits)| {
        Style::new().fg(fg).bg(bg).attrs(Attr::from_bits_truncate(bits))
    })
}

fn styled_lines() -> impl Strategy<Value = Vec<String>> {
    prop::collection::vec(("[ -~]{0,30}", style()), 0..8)
        .prop_map(|spans| spans.iter().map(|(text, style)| encode(text, style)).collect())
}

/// Like `styled_lines`, with double-width glyphs mixed in.
fn wide_styled_lines() -> impl Strategy<Value = Vec<String>> {
    prop::collection::vec(("[ -~日本語]{0,30}", style()), 0..8)
        .prop_map(|spans| spans.iter().map(|(text, style)| encode(text, style)).collect())
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(200))]

    #[test]
    fn encoded_width_matches_plain(text in "[ -~]{0,60}", style in style()) {
        let encoded = encode(&text, &style);
        prop_assert_eq!(visible_length(&encoded), visible_length(&encode(&text, &Style::new())));
        prop_assert_eq!(visible_length(&encoded), text.len());
        prop_assert_eq!(strip(&encoded), text);
    }

    #[test]
    fn truncate_never_exceeds_width(text in "[ -~]{0,60}", style in style(), width in 0usize..40) {
        let clipped = truncate(&encode(&text, &style), width);
        prop_assert!(visible_length(&clipped) <= width);
    }

    #[test]
    fn horizontal_join_is_rectangular(left in styled_lines(), right in styled_lines()) {
        let mut joined = FrameBuffer::from_lines(left.clone());
        let right = FrameBuffer::from_lines(right);
        let left_width = joined.width();
        joined.append_horizontally(&right, VerticalAlignment::Center);

        prop_assert_eq!(joined.height(), left.len().max(right.height()));
        for line in joined.lines() {
            prop_assert_eq!(visible_length(line), left_width + right.width());
        }
    }

    #[test]
    fn overlay_stays_inside_base(
        base in styled_lines(),
        layer in styled_lines(),
        row in 0usize..10,
        column in 0usize..40,
    ) {
        let mut buffer = FrameBuffer::from_lines(base);
        let width = buffer.width();
        let height = buffer.height();
        buffer.overlay(&FrameBuffer::from_lines(layer), row, column);

        prop_assert_eq!(buffer.height(), height);
        prop_assert!(buffer.width() <= width);
    }

    #[test]
    fn output_lines_fill_the_screen(
        lines in wide_styled_lines(),
        width in 1usize..60,
        height in 0usize..20,
    ) {
        let buffer = FrameBuffer::from_lines(lines);
        let output = build_output_lines(&buffer, width, height, "\x1b[44m", RESET);

        prop_assert_eq!(output.len(), height);
        for line in &output {
            prop_assert_eq!(visible_length(line), width);
            prop_assert!(line.starts_with("\x1b[44m"));
            prop_assert!(line.ends_with(RESET));

            let body = &line[..line.len() - RESET.len()];
            let restored = format!("{}\x1b[44m", RESET);
            prop_assert_eq!(body.matches(RESET).count(), body.matches(restored.as_str()).count());
        }
    }
}
