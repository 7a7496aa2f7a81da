#![no_main]

use libfuzzer_sys::fuzz_target;

use monkey::evaluator::Evaluator;
use monkey::object::Environment;
use monkey::parser::Parser;

fuzz_target!(|data: &[u8]| {
    if let Ok(s) = std::str::from_utf8(data) {
        // keep generated programs small enough that recursion stays shallow
        if let Ok(program) = Parser::parse(s) {
            if s.len() <= 64 && !s.contains("fn") {
                let _ = Evaluator::new().eval_program(&program, &Environment::new());
            }
        }
    }
});
