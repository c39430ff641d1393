//! CSS 选择器子集
//!
//! 支持：类型选择器、`*`、`#id`、`.class`、`[attr]`、`[attr=v]`、`[attr~=v]`、
//! `[attr*=v]`、`[attr^=v]`、`[attr$=v]`、复合选择器、后代（空格）与子代（`>`）组合符、逗号列表。
//!
//! 属性值比较统一按 ASCII 忽略大小写处理。

use nom::{
    branch::alt,
    bytes::complete::{tag, take_while1},
    character::complete::{char, multispace0, multispace1, none_of},
    combinator::{all_consuming, map, opt, recognize, value, verify},
    multi::{many0, many1},
    sequence::{delimited, pair, preceded, tuple},
    IResult,
};
use tracing::debug;

use crate::dom::tree::{NodeId, PageTree};
use crate::error::{AppError, AppResult};

/// 属性比较运算符
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AttrOp {
    /// `=`
    Equals,
    /// `~=`（空白分隔的词列表中包含）
    Includes,
    /// `*=`
    Contains,
    /// `^=`
    Prefix,
    /// `$=`
    Suffix,
}

/// 属性过滤条件
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AttrFilter {
    pub name: String,
    pub op: Option<(AttrOp, String)>,
}

impl AttrFilter {
    fn matches(&self, actual: Option<&str>) -> bool {
        let Some(actual) = actual else {
            return false;
        };
        let Some((op, expected)) = &self.op else {
            return true;
        };

        let actual = actual.to_ascii_lowercase();
        let expected = expected.to_ascii_lowercase();
        match op {
            AttrOp::Equals => actual == expected,
            AttrOp::Includes => actual.split_whitespace().any(|word| word == expected),
            AttrOp::Contains => !expected.is_empty() && actual.contains(&expected),
            AttrOp::Prefix => !expected.is_empty() && actual.starts_with(&expected),
            AttrOp::Suffix => !expected.is_empty() && actual.ends_with(&expected),
        }
    }
}

/// 复合选择器（不含组合符的一段）
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Compound {
    pub tag: Option<String>,
    pub id: Option<String>,
    pub classes: Vec<String>,
    pub attrs: Vec<AttrFilter>,
}

impl Compound {
    fn is_empty(&self) -> bool {
        self.tag.is_none() && self.id.is_none() && self.classes.is_empty() && self.attrs.is_empty()
    }

    fn matches<T: PageTree + ?Sized>(&self, tree: &T, node: NodeId) -> bool {
        if let Some(tag) = &self.tag {
            if !tree.tag(node).eq_ignore_ascii_case(tag) {
                return false;
            }
        }
        if let Some(id) = &self.id {
            if tree.attr(node, "id") != Some(id.as_str()) {
                return false;
            }
        }
        if !self.classes.is_empty() {
            let class_attr = tree.attr(node, "class").unwrap_or("");
            let has_all = self
                .classes
                .iter()
                .all(|wanted| class_attr.split_whitespace().any(|c| c == wanted));
            if !has_all {
                return false;
            }
        }
        self.attrs
            .iter()
            .all(|filter| filter.matches(tree.attr(node, &filter.name)))
    }
}

/// 组合符
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Combinator {
    Descendant,
    Child,
}

/// 已解析的单个选择器
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Selector {
    source: String,
    compounds: Vec<Compound>,
    /// `combinators[i]` 连接 `compounds[i]` 与 `compounds[i + 1]`
    combinators: Vec<Combinator>,
}

impl Selector {
    /// 解析单个选择器（不含逗号）
    pub fn parse(source: &str) -> AppResult<Self> {
        let trimmed = source.trim();
        match all_consuming(complex_selector)(trimmed) {
            Ok((_, (first, rest))) => {
                let mut compounds = vec![first];
                let mut combinators = Vec::new();
                for (combinator, compound) in rest {
                    combinators.push(combinator);
                    compounds.push(compound);
                }
                Ok(Self {
                    source: trimmed.to_string(),
                    compounds,
                    combinators,
                })
            }
            Err(e) => Err(AppError::InvalidSelector {
                selector: trimmed.to_string(),
                reason: format!("{:?}", e),
            }),
        }
    }

    /// 解析逗号分隔的选择器列表
    pub fn parse_list(source: &str) -> AppResult<Vec<Self>> {
        source
            .split(',')
            .filter(|part| !part.trim().is_empty())
            .map(Self::parse)
            .collect()
    }

    /// 宽松解析：无法解析的选择器记录日志后跳过，其余照常使用
    pub fn parse_lossy<S: AsRef<str>>(sources: &[S]) -> Vec<Self> {
        let mut selectors = Vec::new();
        for source in sources {
            match Self::parse_list(source.as_ref()) {
                Ok(list) => selectors.extend(list),
                Err(e) => debug!("跳过无效选择器: {}", e),
            }
        }
        selectors
    }

    pub fn source(&self) -> &str {
        &self.source
    }

    /// 判断节点是否匹配（从右向左匹配）
    pub fn matches<T: PageTree + ?Sized>(&self, tree: &T, node: NodeId) -> bool {
        self.matches_at(tree, node, self.compounds.len() - 1)
    }

    fn matches_at<T: PageTree + ?Sized>(&self, tree: &T, node: NodeId, index: usize) -> bool {
        if !self.compounds[index].matches(tree, node) {
            return false;
        }
        if index == 0 {
            return true;
        }

        match self.combinators[index - 1] {
            Combinator::Child => tree
                .parent(node)
                .map_or(false, |parent| self.matches_at(tree, parent, index - 1)),
            Combinator::Descendant => {
                let mut current = tree.parent(node);
                while let Some(ancestor) = current {
                    if self.matches_at(tree, ancestor, index - 1) {
                        return true;
                    }
                    current = tree.parent(ancestor);
                }
                false
            }
        }
    }
}

impl std::fmt::Display for Selector {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.source)
    }
}

// ============================================================================
// nom 解析器
// ============================================================================

enum Simple {
    Id(String),
    Class(String),
    Attr(AttrFilter),
}

fn ident(input: &str) -> IResult<&str, String> {
    map(
        take_while1(|c: char| c.is_alphanumeric() || c == '-' || c == '_'),
        |s: &str| s.to_string(),
    )(input)
}

fn type_selector(input: &str) -> IResult<&str, Option<String>> {
    alt((value(None, char('*')), map(ident, Some)))(input)
}

fn quoted(input: &str) -> IResult<&str, String> {
    alt((
        delimited(
            char('"'),
            map(opt(recognize(many1(none_of("\"")))), |s: Option<&str>| {
                s.unwrap_or("").to_string()
            }),
            char('"'),
        ),
        delimited(
            char('\''),
            map(opt(recognize(many1(none_of("'")))), |s: Option<&str>| {
                s.unwrap_or("").to_string()
            }),
            char('\''),
        ),
    ))(input)
}

fn unquoted(input: &str) -> IResult<&str, String> {
    map(
        take_while1(|c: char| c != ']' && !c.is_whitespace()),
        |s: &str| s.to_string(),
    )(input)
}

fn attr_op(input: &str) -> IResult<&str, AttrOp> {
    alt((
        value(AttrOp::Includes, tag("~=")),
        value(AttrOp::Contains, tag("*=")),
        value(AttrOp::Prefix, tag("^=")),
        value(AttrOp::Suffix, tag("$=")),
        value(AttrOp::Equals, tag("=")),
    ))(input)
}

fn attr_filter(input: &str) -> IResult<&str, AttrFilter> {
    map(
        delimited(
            char('['),
            tuple((
                multispace0,
                ident,
                multispace0,
                opt(tuple((attr_op, multispace0, alt((quoted, unquoted))))),
                multispace0,
            )),
            char(']'),
        ),
        |(_, name, _, op, _)| AttrFilter {
            name: name.to_ascii_lowercase(),
            op: op.map(|(op, _, value)| (op, value)),
        },
    )(input)
}

fn simple(input: &str) -> IResult<&str, Simple> {
    alt((
        map(preceded(char('#'), ident), Simple::Id),
        map(preceded(char('.'), ident), Simple::Class),
        map(attr_filter, Simple::Attr),
    ))(input)
}

fn compound(input: &str) -> IResult<&str, Compound> {
    verify(
        map(pair(opt(type_selector), many0(simple)), |(tag, simples)| {
            let mut compound = Compound {
                tag: tag.flatten(),
                ..Default::default()
            };
            for simple in simples {
                match simple {
                    Simple::Id(id) => compound.id = Some(id),
                    Simple::Class(class) => compound.classes.push(class),
                    Simple::Attr(attr) => compound.attrs.push(attr),
                }
            }
            compound
        }),
        // `*` 单独出现时 tag 为 None 且无其他条件，仍视为合法（匹配所有）
        |compound: &Compound| !compound.is_empty() || input.starts_with('*'),
    )(input)
}

fn combinator(input: &str) -> IResult<&str, Combinator> {
    alt((
        value(
            Combinator::Child,
            delimited(multispace0, char('>'), multispace0),
        ),
        value(Combinator::Descendant, multispace1),
    ))(input)
}

fn complex_selector(input: &str) -> IResult<&str, (Compound, Vec<(Combinator, Compound)>)> {
    pair(compound, many0(pair(combinator, compound)))(input)
}
