//! Peephole cleanup over emitted assembly lines.

/// Remove `MOV r, r` instructions whose source and destination are the same
/// register. Returns the number of lines eliminated.
///
/// This is a single forward walk over the listing; no other rewrite is
/// attempted.
pub fn eliminate_redundant_moves(lines: &mut Vec<String>) -> usize {
    let before = lines.len();

    lines.retain(|line| !is_redundant_move(line));

    before - lines.len()
}

fn is_redundant_move(line: &str) -> bool {
    let mut parts = line.split_whitespace();
    if parts.next() != Some("MOV") {
        return false;
    }

    let (Some(dest), Some(src)) = (parts.next(), parts.next()) else {
        return false;
    };

    dest.trim_end_matches(',') == src
}

#[cfg(test)]
mod tests {
    use super::*;

    fn lines(raw: &[&str]) -> Vec<String> {
        raw.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_removes_redundant_move() {
        let mut asm = lines(&["    MOV R1, R1", "    ADD R1, #2"]);
        let eliminated = eliminate_redundant_moves(&mut asm);
        assert_eq!(eliminated, 1);
        assert_eq!(asm, lines(&["    ADD R1, #2"]));
    }

    #[test]
    fn test_keeps_useful_moves() {
        let mut asm = lines(&["    MOV R1, R0", "    MOV R0, R2"]);
        let eliminated = eliminate_redundant_moves(&mut asm);
        assert_eq!(eliminated, 0);
        assert_eq!(asm.len(), 2);
    }

    #[test]
    fn test_counts_multiple_eliminations() {
        let mut asm = lines(&[
            "    MOV R0, R0",
            "    LOAD R1, #5",
            "    MOV R2, R2",
            "    MOV RAX, R1",
        ]);
        assert_eq!(eliminate_redundant_moves(&mut asm), 2);
        assert_eq!(asm.len(), 2);
    }

    #[test]
    fn test_no_move_left_after_pass() {
        let mut asm = lines(&["    MOV R3, R3", "    MOV R3, R3"]);
        eliminate_redundant_moves(&mut asm);
        assert!(!asm.iter().any(|l| is_redundant_move(l)));
    }

    #[test]
    fn test_ignores_non_move_lines() {
        let mut asm = lines(&["main:", "    PUSH BP", "; MOV comment", ""]);
        assert_eq!(eliminate_redundant_moves(&mut asm), 0);
        assert_eq!(asm.len(), 4);
    }

    #[test]
    fn test_prefix_register_names_are_distinct() {
        // R1 vs R11 must not be treated as equal.
        let mut asm = lines(&["    MOV R1, R11"]);
        assert_eq!(eliminate_redundant_moves(&mut asm), 0);
    }
}
