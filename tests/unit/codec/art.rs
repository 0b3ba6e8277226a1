use super::*;

#[test]
fn zero_renders_its_outline() {
    let lines = code_lines(0x113F);
    assert_eq!(lines[0], " ___ ");
    assert_eq!(lines[1], "|  /|");
    assert_eq!(lines[2], "     ");
    assert_eq!(lines[3], "|/  |");
    assert_eq!(lines[4], " \u{203e}\u{203e}\u{203e} ");
    assert_eq!(lines[5], "     ");
}

#[test]
fn middle_bars_and_underline() {
    let lines = code_lines(0x2200 | UNDERLINE_BIT);
    assert_eq!(lines[2], "-- --");
    assert_eq!(lines[5], "_____");
}

#[test]
fn colon_adds_dots() {
    let lines = code_lines(COLON_BIT);
    assert_eq!(lines[1], "      • ");
    assert_eq!(lines[3], "      • ");
    assert!(lines.iter().all(|l| l.chars().count() == 8));
}

#[test]
fn every_row_has_the_same_width() {
    let text = render_command("1:2").unwrap();
    let widths: Vec<usize> = text.lines().map(|l| l.chars().count()).collect();
    assert_eq!(widths, vec![16; ART_LINES]);
    assert!(text.ends_with('\n'));
}

#[test]
fn bad_command_is_reported() {
    assert!(render_command("{0x").is_err());
}
