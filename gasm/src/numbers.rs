use crate::{new_parser_error, Result, Rule};
use gvm::Word;
use matches::debug_assert_matches;
use pest::iterators::Pair;

/// Parses a decimal or hexadecimal literal into a word, mapping failures
/// (such as values exceeding 32 bits) onto the offending span.
pub(crate) fn process_number(pair: Pair<Rule>) -> Result<Word> {
    debug_assert_matches!(pair.as_rule(), Rule::number);
    let inner = pair.into_inner().next().unwrap();
    let span = inner.as_span();

    let result = match inner.as_rule() {
        Rule::dec_number => Word::from_str_radix(inner.as_str(), 10),
        Rule::hex_number => Word::from_str_radix(&inner.as_str()[2..], 16),
        _ => unreachable!(),
    };

    result.map_err(|err| new_parser_error(span, format!("parsing number failed: {}", err)))
}
