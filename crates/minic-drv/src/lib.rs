//! minic-drv - Compiler driver.
//!
//! Orchestrates the five stages in order: scanner, parser, semantic
//! analyzer, TAC generator, code generator. Each stage fully consumes the
//! previous stage's output before the next begins; a second compilation run
//! uses a fresh set of stage objects.
//!
//! The driver also owns everything the core stages deliberately do not:
//! stage banners, artifact pretty-printing (token table, AST tree, symbol
//! table, TAC listing, assembly), and error presentation.

mod print;

pub use print::{format_ast, format_tokens};

use minic_gen::AsmGenerator;
use minic_lex::LexicalError;
use minic_par::ParseError;
use minic_sem::{SemanticAnalyzer, SemanticError};
use thiserror::Error;
use tracing::debug;

/// The built-in example program, used by `--example` and when no input file
/// is given.
pub const EXAMPLE_SOURCE: &str = "\
int factorial(int n) {
    if (n <= 1) {
        return 1;
    }
    return n * factorial(n - 1);
}

int main() {
    int x;
    x = 5;
    int result;
    result = factorial(x);
    return result;
}
";

/// Any diagnosed failure from the pipeline.
#[derive(Debug, Error)]
pub enum CompileError {
    #[error(transparent)]
    Lexical(#[from] LexicalError),

    #[error(transparent)]
    Parse(#[from] ParseError),

    #[error(transparent)]
    Semantic(#[from] SemanticError),
}

/// Compile a source string through all five stages.
///
/// Returns `true` on success. On a diagnosed failure the error is printed
/// and `false` is returned. When `verbose` is true, each stage prints a
/// banner and its artifact.
pub fn compile(source: &str, verbose: bool) -> bool {
    match run_pipeline(source, verbose) {
        Ok(()) => {
            if verbose {
                println!();
                println!("compilation completed successfully");
            }
            true
        }
        Err(CompileError::Semantic(err)) => {
            eprintln!("error: {}", err);
            for message in &err.messages {
                eprintln!("  - {}", message);
            }
            false
        }
        Err(err) => {
            eprintln!("error: {}", err);
            false
        }
    }
}

fn run_pipeline(source: &str, verbose: bool) -> Result<(), CompileError> {
    // Stage 1: lexical analysis
    debug!("stage 1: lexical analysis");
    let tokens = minic_lex::tokenize(source)?;
    if verbose {
        print_banner("STAGE 1: LEXICAL ANALYSIS");
        print!("{}", format_tokens(&tokens));
        println!("total tokens: {}", tokens.len());
    }

    // Stage 2: parsing
    debug!("stage 2: parsing");
    let program = minic_par::parse(tokens)?;
    if verbose {
        print_banner("STAGE 2: SYNTAX ANALYSIS");
        print!("{}", format_ast(&program));
    }

    // Stage 3: semantic analysis
    debug!("stage 3: semantic analysis");
    let mut analyzer = SemanticAnalyzer::new();
    analyzer.analyze(&program)?;
    if verbose {
        print_banner("STAGE 3: SEMANTIC ANALYSIS");
        print::print_symbol_table(analyzer.symbol_table());
    }

    // Stage 4: intermediate code generation
    debug!("stage 4: intermediate code generation");
    let tac = minic_tac::lower(&program);
    if verbose {
        print_banner("STAGE 4: INTERMEDIATE CODE GENERATION");
        for instruction in &tac {
            println!("  {}", instruction);
        }
        println!("total TAC instructions: {}", tac.len());
    }

    // Stage 5: code generation and peephole optimization
    debug!("stage 5: code generation");
    let mut generator = AsmGenerator::new();
    generator.generate(&tac);
    let eliminated = generator.optimize();
    if verbose {
        print_banner("STAGE 5: CODE GENERATION AND OPTIMIZATION");
        for line in generator.lines() {
            println!("{}", line);
        }
        println!();
        println!("{} redundant instruction(s) eliminated", eliminated);
        print::print_register_table(&generator);
    }

    Ok(())
}

fn print_banner(title: &str) {
    println!();
    println!("{}", "=".repeat(60));
    println!(" {}", title);
    println!("{}", "=".repeat(60));
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_compile_example_succeeds() {
        assert!(compile(EXAMPLE_SOURCE, false));
    }

    #[test]
    fn test_compile_reports_lexical_error() {
        assert!(!compile("int x = 5 @", false));
    }

    #[test]
    fn test_compile_reports_parse_error() {
        assert!(!compile("int main() { return 1 }", false));
    }

    #[test]
    fn test_compile_reports_semantic_error() {
        assert!(!compile("int main() { return nope; }", false));
    }

    #[test]
    fn test_fresh_run_is_independent() {
        // Two runs over the same source use fresh counters and tables.
        assert!(compile("int main() { return 1 + 2; }", false));
        assert!(compile("int main() { return 1 + 2; }", false));
    }
}
