// src/ai/fallback.rs
//! Deterministic fallback content used when the model is unreachable or
//! its output fails validation. Copy is Korean, matching the service's
//! target market; templates are parameterized only by the request keyword
//! and the top extracted keywords.

use crate::keywords::KeywordFrequency;
use crate::providers::Sentiment;

use super::{
    AdAnalysis, AdEvaluation, AdImprovement, AdSuggestion, ItemSentiment, OurAd, SentimentSummary,
};

/// "Fully neutral, no data" sentinel.
pub fn neutral_sentiment() -> SentimentSummary {
    SentimentSummary {
        positive: 0.0,
        negative: 0.0,
        neutral: 100.0,
        positive_keywords: Vec::new(),
        negative_keywords: Vec::new(),
    }
}

/// Every item neutral at 0.5.
pub fn neutral_classifications(count: usize) -> Vec<ItemSentiment> {
    (0..count)
        .map(|index| ItemSentiment {
            index,
            sentiment: Sentiment::Neutral,
            score: 0.5,
        })
        .collect()
}

pub fn summary_unavailable() -> String {
    "요약 서비스에 일시적인 오류가 발생했습니다.".to_string()
}

fn related(keywords: &[KeywordFrequency], idx: usize, or: &str) -> String {
    keywords
        .get(idx)
        .map(|k| k.keyword.clone())
        .unwrap_or_else(|| or.to_string())
}

/// The 10-entry template set used by the analysis pipeline.
pub fn default_ad_suggestions(keyword: &str, keywords: &[KeywordFrequency]) -> Vec<AdSuggestion> {
    let rel0 = related(keywords, 0, "전문가");
    let rel1 = related(keywords, 1, "고객");
    let rel2 = related(keywords, 2, "사용자");

    vec![
        AdSuggestion {
            headline: format!("{keyword}로 지금 바로 시작하세요"),
            description: format!(
                "최고의 {keyword} 솔루션으로 당신의 문제를 해결해 드립니다. 지금 확인해 보세요!"
            ),
            target: "모든 사용자".to_string(),
        },
        AdSuggestion {
            headline: format!("전문가들이 추천하는 {keyword}"),
            description: format!(
                "{rel0}의 추천으로 더 나은 결과를 경험하세요. 클릭 한 번으로 시작하세요."
            ),
            target: "품질을 중시하는 고객".to_string(),
        },
        AdSuggestion {
            headline: format!("{keyword}의 새로운 기준"),
            description: format!("최신 트렌드에 맞춘 {keyword} 서비스로 차별화된 경험을 제공합니다."),
            target: "트렌드에 민감한 사용자".to_string(),
        },
        AdSuggestion {
            headline: format!("{keyword} 고민, 이제 끝!"),
            description: format!("{rel1} 만족도 98%! 검증된 {keyword} 서비스를 지금 확인하세요."),
            target: "문제 해결이 필요한 고객".to_string(),
        },
        AdSuggestion {
            headline: format!("단 7일만에 {keyword} 마스터"),
            description: format!("빠르고 쉽게 {keyword}를 배우는 방법. 지금 가입하면 무료 체험 제공!"),
            target: "효율을 중시하는 고객".to_string(),
        },
        AdSuggestion {
            headline: format!("{keyword}의 숨겨진 비밀"),
            description: format!("많은 사람들이 모르는 {keyword}의 효과적인 활용법을 알려드립니다."),
            target: "깊은 정보를 원하는 고객".to_string(),
        },
        AdSuggestion {
            headline: format!("{keyword} 비용 50% 절감 방법"),
            description: format!("스마트한 선택으로 {keyword} 비용을 절반으로 줄이세요. 지금 클릭!"),
            target: "비용 효율을 중시하는 고객".to_string(),
        },
        AdSuggestion {
            headline: format!("1위 {keyword} 서비스"),
            description: format!("{rel2} 평가 1위! 최고의 {keyword} 솔루션을 지금 만나보세요."),
            target: "신뢰성을 중시하는 고객".to_string(),
        },
        AdSuggestion {
            headline: format!("{keyword} 초보자 가이드"),
            description: format!(
                "{keyword}를 처음 접하는 분들을 위한 친절한 가이드. 지금 무료로 시작하세요!"
            ),
            target: "초보 사용자".to_string(),
        },
        AdSuggestion {
            headline: format!("{keyword} 전문가의 조언"),
            description: format!("10년 경력의 {keyword} 전문가가 알려주는 핵심 팁과 노하우."),
            target: "전문적인 정보를 찾는 고객".to_string(),
        },
    ]
}

/// The shorter 3-entry set used by the standalone suggestion endpoint.
pub fn short_ad_suggestions(keyword: &str) -> Vec<AdSuggestion> {
    vec![
        AdSuggestion {
            headline: format!("{keyword}로 지금 바로 시작하세요"),
            description: format!(
                "최고의 {keyword} 솔루션으로 당신의 문제를 해결해 드립니다. 지금 확인해 보세요!"
            ),
            target: "모든 사용자".to_string(),
        },
        AdSuggestion {
            headline: format!("전문가들이 추천하는 {keyword}"),
            description: "전문가의 추천으로 더 나은 결과를 경험하세요. 클릭 한 번으로 시작하세요."
                .to_string(),
            target: "품질을 중시하는 고객".to_string(),
        },
        AdSuggestion {
            headline: format!("{keyword}의 새로운 기준"),
            description: format!("최신 트렌드에 맞춘 {keyword} 서비스로 차별화된 경험을 제공합니다."),
            target: "트렌드에 민감한 사용자".to_string(),
        },
    ]
}

/// Default analysis block when the vision model's answer carries no JSON
/// object (image too blurry, ad not identified, ...).
pub fn default_ad_analysis() -> AdAnalysis {
    AdAnalysis {
        our_ad: OurAd {
            rank: 0,
            evaluation: AdEvaluation {
                title: "이미지에서 해당 업체의 광고를 식별할 수 없습니다.".to_string(),
                description: "이미지 품질을 확인하거나 다른 이미지를 업로드해주세요.".to_string(),
            },
        },
        competitor_analysis: "1. [경쟁사 광고 없음] - 이미지에서 경쟁사 광고를 식별할 수 없습니다.\n\
             2. [경쟁사 광고 없음] - 더 선명한 이미지를 업로드해 주세요.\n\
             3. [경쟁사 광고 없음] - 전체 검색 결과가 보이는 이미지로 다시 시도해 주세요."
            .to_string(),
        ad_suggestions: default_ad_improvements(),
    }
}

/// Generic improvement suggestions, reused when the model omits its own.
pub fn default_ad_improvements() -> Vec<AdImprovement> {
    vec![
        AdImprovement {
            title: "키워드 중심 제목".to_string(),
            description: "USP를 강조한 설명".to_string(),
            improvement_points: "키워드와 관련된 명확한 USP(고유 판매 제안)를 광고 제목에 포함하세요."
                .to_string(),
        },
        AdImprovement {
            title: "타겟 고객 중심 제목".to_string(),
            description: "문제 해결을 강조한 설명".to_string(),
            improvement_points: "타겟 고객층에게 직접적으로 호소하는 문구를 사용하세요.".to_string(),
        },
        AdImprovement {
            title: "행동 유도 중심 제목".to_string(),
            description: "혜택을 강조한 설명".to_string(),
            improvement_points: "명확한 행동 유도(Call to Action)를 포함하세요.".to_string(),
        },
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn neutral_sentiment_sums_to_hundred() {
        let s = neutral_sentiment();
        assert_eq!(s.positive + s.negative + s.neutral, 100.0);
        assert!(s.positive_keywords.is_empty());
    }

    #[test]
    fn default_suggestions_have_ten_entries_with_keyword() {
        let kws = vec![KeywordFrequency {
            keyword: "원두".to_string(),
            frequency: 4,
        }];
        let out = default_ad_suggestions("커피", &kws);
        assert_eq!(out.len(), 10);
        assert!(out.iter().any(|a| a.headline.contains("커피")));
        assert!(out[1].description.contains("원두"));
    }

    #[test]
    fn short_suggestions_have_three_entries() {
        assert_eq!(short_ad_suggestions("커피").len(), 3);
    }

    #[test]
    fn neutral_classifications_cover_every_index() {
        let v = neutral_classifications(3);
        assert_eq!(v.len(), 3);
        assert!(v.iter().enumerate().all(|(i, c)| c.index == i && c.score == 0.5));
    }
}
