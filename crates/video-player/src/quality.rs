use video_stream_types::QualityOption;

use crate::engine::EngineLevel;

/// Build the quality menu: the automatic entry, then every engine level in
/// engine order.
pub fn quality_options(levels: &[EngineLevel]) -> Vec<QualityOption> {
    std::iter::once(QualityOption::auto())
        .chain(
            levels
                .iter()
                .enumerate()
                .map(|(index, level)| QualityOption::level(level.height, index as i32)),
        )
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn auto_entry_leads_engine_levels() {
        let levels = [
            EngineLevel { height: 360 },
            EngineLevel { height: 720 },
            EngineLevel { height: 1080 },
        ];
        let options = quality_options(&levels);
        assert_eq!(
            options,
            vec![
                QualityOption::auto(),
                QualityOption::level(360, 0),
                QualityOption::level(720, 1),
                QualityOption::level(1080, 2),
            ]
        );
    }

    #[test]
    fn engine_order_is_preserved() {
        let levels = [EngineLevel { height: 1080 }, EngineLevel { height: 240 }];
        let options = quality_options(&levels);
        assert_eq!(options[1].label, "1080");
        assert_eq!(options[2].label, "240");
        assert_eq!(options[2].level_index, 1);
    }

    #[test]
    fn no_levels_still_offers_auto() {
        assert_eq!(quality_options(&[]), vec![QualityOption::auto()]);
    }
}
