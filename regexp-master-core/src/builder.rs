//! Regexp builder for literal word lists
//!
//! Turns an unordered list of words into a single pattern that matches exactly
//! that set. Words are split into units (code points, or raw fragments from the
//! special-chars map), merged into a tree of shared prefixes, shared suffixes
//! and alternations, then rendered back to PCRE syntax:
//!
//! ```text
//! ["apple", "april"]  ->  ap(?:ple|ril)
//! ["bar", "baz"]      ->  ba[rz]
//! ["foo", "fool"]     ->  fool?
//! ["foo", "bar"]      ->  (?=[bf])(?:bar|foo)
//! ```

use std::collections::{BTreeSet, HashSet};
use std::str;

use log::{debug, trace};

use crate::error::{RegexpError, Result};
use crate::options::{ListOptions, SpecialCharsMap};

/// Fragments that match any run of characters except line terminators
const WILDCARDS: [&str; 2] = [".*?", ".*"];

/// Code points `.` does not match in a JavaScript regexp
const LINE_TERMINATORS: [char; 4] = ['\n', '\r', '\u{2028}', '\u{2029}'];

/// One element of a word: either a literal code point or a raw fragment
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub(crate) enum Unit<'a> {
    Literal(char),
    Special(&'a str),
}

/// A node of the merged tree, rendered in sequence with its siblings
#[derive(Debug, Clone, PartialEq)]
pub(crate) enum Node<'a> {
    /// A single unit
    Unit(Unit<'a>),
    /// Several literal code points, any of which matches
    Class(Vec<char>),
    /// Two or more branches, each a sequence of nodes
    Alternation(Vec<Vec<Node<'a>>>),
    /// A sequence that may be absent
    Optional(Vec<Node<'a>>),
}

/// Build a regexp that matches exactly the given words
///
/// Words are given as bytes and must be valid UTF-8. The input order does not
/// matter: words are sorted and deduplicated before merging.
///
/// # Example
/// ```
/// use regexp_master_core::{build_regexp_from_list, ListOptions};
///
/// let regexp = build_regexp_from_list(&["apple", "april"], &ListOptions::default()).unwrap();
/// assert_eq!(regexp, "ap(?:ple|ril)");
/// ```
///
/// # Errors
/// Returns [`RegexpError::InvalidUtf8`] if any word is not well-formed UTF-8.
pub fn build_regexp_from_list<W: AsRef<[u8]>>(words: &[W], options: &ListOptions) -> Result<String> {
    let mut words = words
        .iter()
        .enumerate()
        .map(|(index, word)| {
            str::from_utf8(word.as_ref()).map_err(|_| RegexpError::InvalidUtf8 { word: index })
        })
        .collect::<Result<Vec<&str>>>()?;
    words.sort_unstable();
    words.dedup();

    let mut seen = HashSet::new();
    let chains: Vec<Vec<Unit<'_>>> = words
        .iter()
        .map(|word| split_units(word, &options.special_chars))
        .filter(|chain| seen.insert(chain.clone()))
        .collect();

    let tree = merge(chains.clone());
    trace!("merged tree: {:?}", tree);

    let mut regexp = String::new();
    if use_lookahead(&chains, &tree, options) {
        let initials: BTreeSet<char> = chains
            .iter()
            .filter_map(|chain| match chain.first() {
                Some(Unit::Literal(c)) => Some(*c),
                _ => None,
            })
            .collect();
        regexp.push_str("(?=");
        render_node(&Node::Class(initials.into_iter().collect()), &mut regexp);
        regexp.push(')');
    }
    render_sequence(&tree, &mut regexp);

    debug!("built regexp {:?} from {} words", regexp, chains.len());
    Ok(regexp)
}

/// Split a word into units, replacing the longest matching special-char key
/// at each position by its fragment
fn split_units<'a>(word: &str, special_chars: &'a SpecialCharsMap) -> Vec<Unit<'a>> {
    let mut units = Vec::with_capacity(word.len());
    let mut rest = word;

    while let Some(c) = rest.chars().next() {
        let special = special_chars
            .iter()
            .filter(|(key, _)| !key.is_empty() && rest.starts_with(key.as_str()))
            .max_by_key(|(key, _)| key.len());

        match special {
            Some((key, fragment)) => {
                units.push(Unit::Special(fragment.as_str()));
                rest = &rest[key.len()..];
            }
            None => {
                units.push(Unit::Literal(c));
                rest = &rest[c.len_utf8()..];
            }
        }
    }

    units
}

/// Decide whether the leading lookahead assertion is worth emitting
///
/// It only helps in front of an alternation, and only when every word starts
/// with a literal code point.
fn use_lookahead(chains: &[Vec<Unit<'_>>], tree: &[Node<'_>], options: &ListOptions) -> bool {
    if options.disable_lookahead || !matches!(tree.first(), Some(Node::Alternation(_))) {
        return false;
    }
    if chains.iter().all(|chain| chain.len() == 1) {
        return false;
    }
    chains
        .iter()
        .all(|chain| matches!(chain.first(), Some(Unit::Literal(_))))
}

/// Merge unit chains into a sequence of nodes matching exactly those chains
///
/// Chains must be distinct. Their relative order is kept in the output.
pub(crate) fn merge(chains: Vec<Vec<Unit<'_>>>) -> Vec<Node<'_>> {
    let mut chains = remove_subsumed(chains);

    let count = chains.len();
    chains.retain(|chain| !chain.is_empty());
    let optional = chains.len() < count;

    if chains.is_empty() {
        return Vec::new();
    }
    if optional {
        return vec![Node::Optional(merge(chains))];
    }
    if chains.len() == 1 {
        return chains[0].iter().copied().map(Node::Unit).collect();
    }

    let prefix = common_prefix_len(&chains);
    if prefix > 0 {
        let mut sequence: Vec<Node<'_>> = chains[0][..prefix].iter().copied().map(Node::Unit).collect();
        let tails = chains.iter().map(|chain| chain[prefix..].to_vec()).collect();
        sequence.extend(merge(tails));
        return sequence;
    }

    let suffix = common_suffix_len(&chains);
    if suffix > 0 {
        let first = &chains[0];
        let shared: Vec<Node<'_>> = first[first.len() - suffix..].iter().copied().map(Node::Unit).collect();
        let heads = chains
            .iter()
            .map(|chain| chain[..chain.len() - suffix].to_vec())
            .collect();
        let mut sequence = merge(heads);
        sequence.extend(shared);
        return sequence;
    }

    alternation(chains)
}

/// Group chains by their leading unit and build one branch per group
fn alternation(chains: Vec<Vec<Unit<'_>>>) -> Vec<Node<'_>> {
    let mut groups: Vec<(Unit<'_>, Vec<Vec<Unit<'_>>>)> = Vec::new();
    for chain in chains {
        let head = chain[0];
        let tail = chain[1..].to_vec();
        match groups.iter_mut().find(|(unit, _)| *unit == head) {
            Some((_, tails)) => tails.push(tail),
            None => groups.push((head, vec![tail])),
        }
    }

    let branches: Vec<Vec<Node<'_>>> = groups
        .into_iter()
        .map(|(head, tails)| {
            let mut branch = vec![Node::Unit(head)];
            branch.extend(merge(tails));
            branch
        })
        .collect();

    let mut branches = collapse_into_class(branches);
    if branches.len() == 1 {
        branches.pop().unwrap_or_default()
    } else {
        vec![Node::Alternation(branches)]
    }
}

/// Replace every branch made of a single literal code point by one class
fn collapse_into_class(branches: Vec<Vec<Node<'_>>>) -> Vec<Vec<Node<'_>>> {
    let single = |branch: &Vec<Node<'_>>| match branch.as_slice() {
        [Node::Unit(Unit::Literal(c))] => Some(*c),
        _ => None,
    };

    let chars: Vec<char> = branches.iter().filter_map(single).collect();
    if chars.len() < 2 {
        return branches;
    }

    let mut class = Some(Node::Class(chars));
    let mut collapsed = Vec::with_capacity(branches.len());
    for branch in branches {
        if single(&branch).is_none() {
            collapsed.push(branch);
        } else if let Some(node) = class.take() {
            collapsed.push(vec![node]);
        }
    }
    collapsed
}

/// Drop branches made redundant by a lone wildcard fragment
///
/// A chain consisting of `.*?` alone already matches the empty chain and
/// every purely literal chain without a line terminator.
fn remove_subsumed(chains: Vec<Vec<Unit<'_>>>) -> Vec<Vec<Unit<'_>>> {
    let is_wildcard = |chain: &Vec<Unit<'_>>| {
        matches!(chain.as_slice(), [Unit::Special(fragment)] if WILDCARDS.contains(fragment))
    };
    if !chains.iter().any(is_wildcard) {
        return chains;
    }

    let is_subsumed = |chain: &Vec<Unit<'_>>| {
        chain
            .iter()
            .all(|unit| matches!(unit, Unit::Literal(c) if !LINE_TERMINATORS.contains(c)))
    };

    let count = chains.len();
    let chains: Vec<_> = chains
        .into_iter()
        .filter(|chain| is_wildcard(chain) || !is_subsumed(chain))
        .collect();
    if chains.len() < count {
        trace!("wildcard subsumed {} branches", count - chains.len());
    }
    chains
}

fn common_prefix_len(chains: &[Vec<Unit<'_>>]) -> usize {
    let (first, rest) = match chains.split_first() {
        Some(split) => split,
        None => return 0,
    };
    first
        .iter()
        .enumerate()
        .take_while(|(i, unit)| rest.iter().all(|chain| chain.get(*i) == Some(*unit)))
        .count()
}

fn common_suffix_len(chains: &[Vec<Unit<'_>>]) -> usize {
    let (first, rest) = match chains.split_first() {
        Some(split) => split,
        None => return 0,
    };
    first
        .iter()
        .rev()
        .enumerate()
        .take_while(|(i, unit)| {
            rest.iter()
                .all(|chain| chain.len() > *i && &chain[chain.len() - 1 - i] == *unit)
        })
        .count()
}

/// Render a sequence of nodes
pub(crate) fn render_sequence(sequence: &[Node<'_>], out: &mut String) {
    for node in sequence {
        render_node(node, out);
    }
}

fn render_node(node: &Node<'_>, out: &mut String) {
    match node {
        Node::Unit(Unit::Literal(c)) => escape_char(*c, out),
        Node::Unit(Unit::Special(fragment)) => out.push_str(fragment),
        Node::Class(chars) => {
            let chars: BTreeSet<char> = chars.iter().copied().collect();
            if chars.len() == 1 {
                chars.iter().for_each(|c| escape_char(*c, out));
            } else {
                out.push('[');
                chars.iter().for_each(|c| escape_char(*c, out));
                out.push(']');
            }
        }
        Node::Alternation(branches) => {
            out.push_str("(?:");
            for (i, branch) in branches.iter().enumerate() {
                if i > 0 {
                    out.push('|');
                }
                render_sequence(branch, out);
            }
            out.push(')');
        }
        Node::Optional(sequence) => match sequence.as_slice() {
            [node @ (Node::Unit(Unit::Literal(_)) | Node::Class(_) | Node::Alternation(_))] => {
                render_node(node, out);
                out.push('?');
            }
            _ => {
                out.push_str("(?:");
                render_sequence(sequence, out);
                out.push_str(")?");
            }
        },
    }
}

/// Escape a literal code point the way PCRE quoting does
pub(crate) fn escape_char(c: char, out: &mut String) {
    match c {
        '.' | '\\' | '+' | '*' | '?' | '[' | '^' | ']' | '$' | '(' | ')' | '{' | '}' | '='
        | '!' | '<' | '>' | '|' | ':' | '-' | '#' => {
            out.push('\\');
            out.push(c);
        }
        '\0' => out.push_str("\\x00"),
        _ => out.push(c),
    }
}
