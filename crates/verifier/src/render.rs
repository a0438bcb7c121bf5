//! 선언형 구성 텍스트 렌더링
//!
//! 규칙 명세를 HCL 스타일의 구성 문서로 변환합니다. 렌더링은 순수
//! 함수이며, 같은 입력은 항상 바이트 단위로 동일한 출력을 생성합니다.
//! 부수 효과가 없고, 누락된 필수 파라미터 외에는 오류 조건이 없습니다.

use std::fmt::{self, Write as _};

use natcheck_core::types::{RouterFixture, RuleSpec, RuleTag};

use crate::error::VerifierError;

/// 블록 속성 값
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AttrValue {
    /// 인용 문자열 (이스케이프 적용)
    Str(String),
    /// 불리언 리터럴
    Bool(bool),
    /// 다른 블록 속성에 대한 보간 참조, `"${...}"` 형태로 렌더링
    Ref(String),
    /// 태그 목록, 객체 리스트로 렌더링
    Tags(Vec<RuleTag>),
}

impl AttrValue {
    fn write_to(&self, out: &mut String) {
        match self {
            AttrValue::Str(s) => {
                out.push('"');
                escape_into(s, out);
                out.push('"');
            }
            AttrValue::Bool(b) => {
                let _ = write!(out, "{b}");
            }
            AttrValue::Ref(path) => {
                let _ = write!(out, "\"${{{path}}}\"");
            }
            AttrValue::Tags(tags) => {
                out.push_str("[\n");
                for tag in tags {
                    out.push_str("    { scope = \"");
                    escape_into(&tag.scope, out);
                    out.push_str("\", tag = \"");
                    escape_into(&tag.tag, out);
                    out.push_str("\" },\n");
                }
                out.push_str("  ]");
            }
        }
    }
}

fn escape_into(s: &str, out: &mut String) {
    for c in s.chars() {
        match c {
            '"' => out.push_str("\\\""),
            '\\' => out.push_str("\\\\"),
            '\n' => out.push_str("\\n"),
            other => out.push(other),
        }
    }
}

/// 구성 문서의 단일 블록 (`data` 또는 `resource`)
///
/// 속성은 삽입 순서를 유지하므로 렌더링 순서가 결정적입니다.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Block {
    keyword: &'static str,
    block_type: String,
    label: String,
    attrs: Vec<(String, AttrValue)>,
}

impl Block {
    pub fn data(block_type: impl Into<String>, label: impl Into<String>) -> Self {
        Self {
            keyword: "data",
            block_type: block_type.into(),
            label: label.into(),
            attrs: Vec::new(),
        }
    }

    pub fn resource(block_type: impl Into<String>, label: impl Into<String>) -> Self {
        Self {
            keyword: "resource",
            block_type: block_type.into(),
            label: label.into(),
            attrs: Vec::new(),
        }
    }

    pub fn attr(mut self, key: impl Into<String>, value: AttrValue) -> Self {
        self.attrs.push((key.into(), value));
        self
    }

    /// 이 블록의 `id` 속성을 가리키는 보간 경로
    pub fn id_ref(&self) -> String {
        if self.keyword == "data" {
            format!("data.{}.{}.id", self.block_type, self.label)
        } else {
            format!("{}.{}.id", self.block_type, self.label)
        }
    }

    fn write_to(&self, out: &mut String) {
        let _ = write!(
            out,
            "{} \"{}\" \"{}\" {{\n",
            self.keyword, self.block_type, self.label,
        );
        for (key, value) in &self.attrs {
            let _ = write!(out, "  {key} = ");
            value.write_to(out);
            out.push('\n');
        }
        out.push_str("}\n");
    }
}

/// 렌더링 가능한 전체 구성 문서
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ConfigDocument {
    blocks: Vec<Block>,
}

impl ConfigDocument {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, block: Block) {
        self.blocks.push(block);
    }

    pub fn blocks(&self) -> &[Block] {
        &self.blocks
    }

    /// 문서를 구성 텍스트로 렌더링 (결정적)
    pub fn render(&self) -> String {
        let mut out = String::new();
        for (i, block) in self.blocks.iter().enumerate() {
            if i > 0 {
                out.push('\n');
            }
            block.write_to(&mut out);
        }
        out
    }
}

impl fmt::Display for ConfigDocument {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.render())
    }
}

/// 규칙 명세와 라우터 픽스처로부터 전체 구성 문서를 생성합니다.
///
/// 문서는 엣지 클러스터 data 블록, Tier-1 라우터 블록, NAT 규칙 블록
/// 세 개로 구성되며, 라우터는 엣지 클러스터를 참조하고 규칙은
/// 라우터를 참조합니다.
///
/// # Errors
///
/// 픽스처의 필수 이름이 비어 있으면 [`VerifierError::Config`]를,
/// 명세 자체가 유효하지 않으면 [`VerifierError::Rule`]을 반환합니다.
pub fn rule_document(
    spec: &RuleSpec,
    fixture: &RouterFixture,
) -> Result<ConfigDocument, VerifierError> {
    if fixture.edge_cluster_name.is_empty() {
        return Err(VerifierError::Config {
            field: "edge_cluster_name".to_owned(),
            reason: "required render parameter is empty".to_owned(),
        });
    }
    if fixture.display_name.is_empty() {
        return Err(VerifierError::Config {
            field: "router_display_name".to_owned(),
            reason: "required render parameter is empty".to_owned(),
        });
    }
    spec.validate()?;

    let edge_cluster = Block::data("nsxt_edge_cluster", "EC")
        .attr("display_name", AttrValue::Str(fixture.edge_cluster_name.clone()));

    let router = Block::resource("nsxt_logical_tier1_router", "RTR1")
        .attr("display_name", AttrValue::Str(fixture.display_name.clone()))
        .attr("edge_cluster_id", AttrValue::Ref(edge_cluster.id_ref()));

    let mut rule = Block::resource("nsxt_nat_rule", "test")
        .attr("logical_router_id", AttrValue::Ref(router.id_ref()))
        .attr("display_name", AttrValue::Str(spec.display_name.clone()))
        .attr("description", AttrValue::Str(spec.description.clone()))
        .attr("action", AttrValue::Str(spec.action.to_string()))
        .attr(
            "translated_network",
            AttrValue::Str(spec.translated_network.clone()),
        );
    if let Some(network) = &spec.match_destination_network {
        rule = rule.attr("match_destination_network", AttrValue::Str(network.clone()));
    }
    if let Some(network) = &spec.match_source_network {
        rule = rule.attr("match_source_network", AttrValue::Str(network.clone()));
    }
    rule = rule
        .attr("enabled", AttrValue::Bool(spec.enabled))
        .attr("logging", AttrValue::Bool(spec.logging))
        .attr("nat_pass", AttrValue::Bool(spec.nat_pass));
    if !spec.tags.is_empty() {
        rule = rule.attr("tags", AttrValue::Tags(spec.tags.clone()));
    }

    let mut doc = ConfigDocument::new();
    doc.push(edge_cluster);
    doc.push(router);
    doc.push(rule);
    Ok(doc)
}
