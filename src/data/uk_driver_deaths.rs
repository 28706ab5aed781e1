//! Monthly totals of car drivers killed or seriously injured in Great Britain,
//! January 1969 to December 1984 (Harvey & Durbin, 1986).

/// Calendar year of the first observation.
pub const START_YEAR: i32 = 1969;

/// Calendar month (1-based) of the first observation.
pub const START_MONTH: u32 = 1;

/// One row per year, January through December.
pub const VALUES: [f64; 192] = [
    1687.0, 1508.0, 1507.0, 1385.0, 1632.0, 1511.0, 1559.0, 1630.0, 1579.0, 1653.0, 2152.0, 2148.0,
    1752.0, 1765.0, 1717.0, 1558.0, 1575.0, 1520.0, 1805.0, 1800.0, 1719.0, 2008.0, 2242.0, 2478.0,
    2030.0, 1655.0, 1693.0, 1623.0, 1805.0, 1746.0, 1795.0, 1926.0, 1619.0, 1992.0, 2233.0, 2192.0,
    2080.0, 1768.0, 1835.0, 1569.0, 1976.0, 1853.0, 1965.0, 1689.0, 1778.0, 1976.0, 2397.0, 2654.0,
    2097.0, 1963.0, 1677.0, 1941.0, 2003.0, 1813.0, 2012.0, 1912.0, 2084.0, 2080.0, 2118.0, 2150.0,
    1608.0, 1503.0, 1548.0, 1382.0, 1731.0, 1798.0, 1779.0, 1887.0, 2004.0, 2077.0, 2092.0, 2051.0,
    1577.0, 1356.0, 1652.0, 1382.0, 1519.0, 1421.0, 1442.0, 1543.0, 1656.0, 1561.0, 1905.0, 2199.0,
    1473.0, 1655.0, 1407.0, 1395.0, 1530.0, 1309.0, 1526.0, 1327.0, 1627.0, 1748.0, 1958.0, 2274.0,
    1648.0, 1401.0, 1411.0, 1403.0, 1394.0, 1520.0, 1528.0, 1643.0, 1515.0, 1685.0, 2000.0, 2215.0,
    1956.0, 1462.0, 1563.0, 1459.0, 1446.0, 1622.0, 1657.0, 1638.0, 1643.0, 1683.0, 2050.0, 2262.0,
    1813.0, 1445.0, 1762.0, 1461.0, 1556.0, 1431.0, 1427.0, 1554.0, 1645.0, 1653.0, 2016.0, 2207.0,
    1665.0, 1361.0, 1506.0, 1360.0, 1453.0, 1522.0, 1460.0, 1552.0, 1548.0, 1827.0, 1737.0, 1941.0,
    1474.0, 1458.0, 1542.0, 1404.0, 1522.0, 1385.0, 1641.0, 1510.0, 1681.0, 1938.0, 1868.0, 1726.0,
    1456.0, 1445.0, 1456.0, 1365.0, 1487.0, 1558.0, 1488.0, 1684.0, 1594.0, 1850.0, 1998.0, 2079.0,
    1494.0, 1057.0, 1218.0, 1168.0, 1236.0, 1076.0, 1174.0, 1139.0, 1427.0, 1487.0, 1483.0, 1513.0,
    1357.0, 1165.0, 1282.0, 1110.0, 1297.0, 1185.0, 1222.0, 1284.0, 1444.0, 1575.0, 1737.0, 1763.0,
];
